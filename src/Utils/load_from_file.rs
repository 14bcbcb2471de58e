use crate::Network::network_error::ChemistryError;
use crate::Network::rate_tables::{RateTableStore, TableSource};
use log::{error, info};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::Path;

/// Rate tables read from a JSON document whose top level maps table keys to
/// arrays of `nbins + 1` numbers:
/// ```json
/// { "k01": [1.0e-30, ...], "brem_brem": [...], "gammaH2_1": [...] }
/// ```
pub struct JsonTableFile {
    pub file_name: String,
    tables: HashMap<String, Vec<f64>>,
}

impl JsonTableFile {
    pub fn open(file_name: &str) -> Result<Self, ChemistryError> {
        let tables = load_tables_from_file(file_name)?;
        Ok(JsonTableFile {
            file_name: file_name.to_string(),
            tables,
        })
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl TableSource for JsonTableFile {
    fn read_table(&self, key: &str) -> Result<Vec<f64>, ChemistryError> {
        self.tables.read_table(key)
    }

    fn describe(&self) -> String {
        format!("table file '{}'", self.file_name)
    }
}

/// Parses a table file into a key -> values map.
pub fn load_tables_from_file(file_name: &str) -> Result<HashMap<String, Vec<f64>>, ChemistryError> {
    let path = Path::new(file_name);
    if !path.exists() {
        error!("table file '{}' does not exist", file_name);
        return Err(ChemistryError::FileAccess {
            path: file_name.to_string(),
            source: ErrorKind::NotFound.into(),
        });
    }
    let file = File::open(path).map_err(|e| ChemistryError::FileAccess {
        path: file_name.to_string(),
        source: e,
    })?;
    let reader = BufReader::new(file);
    match serde_json::from_reader::<_, HashMap<String, Vec<f64>>>(reader) {
        Ok(tables) => {
            info!("read {} tables from '{}'", tables.len(), file_name);
            Ok(tables)
        }
        Err(e) => {
            error!(
                "error parsing table file '{}' at line {}, column {}: {}",
                file_name,
                e.line(),
                e.column(),
                e
            );
            Err(ChemistryError::TableFormat(e))
        }
    }
}

/// Writes every table of `store` to `file_name`, keys in sorted order.
pub fn save_tables_to_file(store: &RateTableStore, file_name: &str) -> Result<(), ChemistryError> {
    let sorted: BTreeMap<String, Vec<f64>> = store.to_map().into_iter().collect();
    let file = File::create(file_name).map_err(|e| ChemistryError::FileAccess {
        path: file_name.to_string(),
        source: e,
    })?;
    serde_json::to_writer(BufWriter::new(file), &sorted)?;
    info!("saved {} tables to '{}'", sorted.len(), file_name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Network::analytic_tables::AnalyticTables;
    use crate::Network::rate_tables::{Cooling, Reaction, TemperatureGrid};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_save_then_load_store() {
        let grid = TemperatureGrid::new(1.0, 1e5, 63).unwrap();
        let store = AnalyticTables::primordial(grid.clone()).build().unwrap();
        let file = NamedTempFile::new().unwrap();
        let name = file.path().to_str().unwrap();
        save_tables_to_file(&store, name).unwrap();

        let source = JsonTableFile::open(name).unwrap();
        assert_eq!(source.len(), 53);
        let reloaded = RateTableStore::load(grid, &source).unwrap();
        assert_eq!(reloaded.reaction(Reaction::K13), store.reaction(Reaction::K13));
        assert_eq!(reloaded.cooling(Cooling::H2Lte), store.cooling(Cooling::H2Lte));
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let err = JsonTableFile::open("/no/such/dir/tables.json").err().unwrap();
        assert!(matches!(err, ChemistryError::FileAccess { .. }));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ \"k01\": [1.0, 2.0,] }}").unwrap();
        let err = JsonTableFile::open(file.path().to_str().unwrap()).err().unwrap();
        assert!(matches!(err, ChemistryError::TableFormat(_)));
        assert_eq!(err.status_code(), -2);
    }

    #[test]
    fn test_short_table_in_file() {
        let grid = TemperatureGrid::new(1.0, 1e5, 63).unwrap();
        let store = AnalyticTables::primordial(grid.clone()).build().unwrap();
        let mut map = store.to_map();
        map.insert("k05".to_string(), vec![0.0; 10]);
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&map).unwrap()).unwrap();
        let source = JsonTableFile::open(file.path().to_str().unwrap()).unwrap();
        let err = RateTableStore::load(grid, &source).unwrap_err();
        assert!(matches!(err, ChemistryError::TableLength { found: 10, .. }));
    }
}
