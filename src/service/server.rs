use super::rules;
use super::scorer::Scorer;
use crate::data::Expense;
use crate::features;
use actix_web::App;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::web;
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;

/// one scored expense as the API answers it
#[derive(Debug, Serialize)]
struct Scored {
    score: crate::Probability,
    risk: rules::Risk,
    flags: Vec<&'static str>,
}

fn scored(scorer: &Scorer, expense: &Expense) -> Scored {
    let v = features::vectorize(expense);
    let p = scorer.probability(std::slice::from_ref(&v))[0];
    Scored {
        score: p,
        risk: rules::risk(
            p,
            &expense.category,
            expense.amount,
            expense.request_date,
            expense.travel_date,
        ),
        flags: rules::anomalies(
            &expense.category,
            expense.amount,
            expense.request_date,
            expense.travel_date,
        ),
    }
}

/// optional api-key guard on the scoring routes. no key configured
/// means an open instance.
fn unauthorized(req: &HttpRequest) -> Option<HttpResponse> {
    let key = std::env::var("API_KEY").ok().filter(|k| !k.is_empty())?;
    let sent = req
        .headers()
        .get("X-API-Key")
        .and_then(|v| v.to_str().ok());
    match sent == Some(key.as_str()) {
        true => None,
        false => Some(HttpResponse::Unauthorized().json(json!({ "error": "unauthorized" }))),
    }
}

async fn predict(
    req: HttpRequest,
    scorer: web::Data<Scorer>,
    body: web::Json<Expense>,
) -> HttpResponse {
    if let Some(denied) = unauthorized(&req) {
        return denied;
    }
    if let Some(reason) = rules::validate_amount(&body.category, body.amount) {
        return HttpResponse::BadRequest().json(json!({ "error": reason }));
    }
    let answer = scored(&scorer, &body);
    HttpResponse::Ok().json(json!({
        "score": answer.score,
        "risk": answer.risk,
        "model": scorer.name(),
        "flags": answer.flags,
    }))
}

async fn batch(
    req: HttpRequest,
    scorer: web::Data<Scorer>,
    body: web::Json<Vec<Expense>>,
) -> HttpResponse {
    if let Some(denied) = unauthorized(&req) {
        return denied;
    }
    let answers = body.iter().map(|e| scored(&scorer, e)).collect::<Vec<_>>();
    HttpResponse::Ok().json(answers)
}

/// first rows of the dataset, scored, for the dashboard table
async fn dashboard_data(
    scorer: web::Data<Scorer>,
    query: web::Query<HashMap<String, String>>,
) -> HttpResponse {
    const LIMIT: usize = 200;
    let records = match crate::data::ingest::read("data/synthetic.csv") {
        Ok(records) => records,
        Err(_) => return HttpResponse::Ok().json(json!({ "items": [] })),
    };
    let wanted = query.get("category").map(|c| c.to_lowercase());
    let items = records
        .iter()
        .take(LIMIT)
        .filter(|e| match &wanted {
            Some(c) if !c.is_empty() => e.category.to_lowercase() == *c,
            _ => true,
        })
        .map(|e| {
            let answer = scored(&scorer, e);
            json!({
                "expense_id": e.expense_id,
                "category": e.category,
                "amount": e.amount,
                "department": e.department,
                "date": e.request_date,
                "score": answer.score,
                "risk": answer.risk,
                "model": scorer.name(),
            })
        })
        .collect::<Vec<_>>();
    HttpResponse::Ok().json(json!({ "items": items }))
}

/// last row of the learning-curve table, keyed by its header
async fn dashboard_metrics() -> HttpResponse {
    let table = match read_last("data/learning_curve.csv") {
        Some(table) => table,
        None => return HttpResponse::Ok().json(json!({ "metrics": {} })),
    };
    HttpResponse::Ok().json(json!({ "metrics": table }))
}

fn read_last(path: &str) -> Option<HashMap<String, String>> {
    let mut reader = csv::Reader::from_path(path).ok()?;
    let header = reader.headers().ok()?.clone();
    let last = reader.records().filter_map(|r| r.ok()).last()?;
    Some(
        header
            .iter()
            .zip(last.iter())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

/// serve scoring on the configured port until killed
pub async fn run() -> std::io::Result<()> {
    let scorer = web::Data::new(Scorer::boot());
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);
    log::info!("serving on port {}", port);
    HttpServer::new(move || {
        App::new()
            .app_data(scorer.clone())
            .route("/predict", web::post().to(predict))
            .route("/batch", web::post().to(batch))
            .route("/dashboard/data", web::get().to(dashboard_data))
            .route("/dashboard/metrics", web::get().to(dashboard_metrics))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
