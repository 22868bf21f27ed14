use super::curve::Point;
use plotters::prelude::*;

/// render the accuracy and F1 curves as a png. callers treat failure
/// as a warning, the table itself already lives in the csv.
pub fn render(points: &[Point], path: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = std::path::Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let root = BitMapBackend::new(path, (800, 400)).into_drawing_area();
    root.fill(&WHITE)?;
    let reach = points.iter().map(|p| p.size).max().unwrap_or(1) as f64;
    let mut chart = ChartBuilder::on(&root)
        .caption("Learning curve", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(0f64..reach, 0f64..1f64)?;
    chart
        .configure_mesh()
        .x_desc("training samples")
        .y_desc("metric")
        .draw()?;
    let series: [(&str, RGBColor, fn(&Point) -> f64); 4] = [
        ("train acc", BLUE, |p| p.train_acc),
        ("test acc", RED, |p| p.test_acc),
        ("train f1", GREEN, |p| p.train_f1),
        ("test f1", MAGENTA, |p| p.test_f1),
    ];
    for (label, color, pick) in series {
        let line = points
            .iter()
            .map(|p| (p.size as f64, pick(p)))
            .collect::<Vec<_>>();
        chart
            .draw_series(LineSeries::new(line, color))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], color));
    }
    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()?;
    root.present()?;
    Ok(())
}
