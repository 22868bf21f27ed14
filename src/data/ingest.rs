use super::expense::Expense;
use crate::Error;

/// read the dataset csv into expense records
pub fn read(path: &str) -> Result<Vec<Expense>, Error> {
    let mut reader = csv::Reader::from_path(path)?;
    reader
        .deserialize()
        .collect::<Result<Vec<Expense>, csv::Error>>()
        .map_err(Error::from)
}

/// write expense records as csv, creating parent directories
pub fn write(path: &str, records: &[Expense]) -> Result<(), Error> {
    if let Some(parent) = std::path::Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
