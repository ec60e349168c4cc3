//! INI file configuration adapter.

use crate::domain::error::EngineError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| EngineError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, EngineError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| EngineError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[backtest]
instrument = SPY
initial_cash = 100000.0

[strategy]
short_window = 50
long_window = 200
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("backtest", "instrument"),
            Some("SPY".to_string())
        );
        assert_eq!(adapter.get_int("strategy", "short_window").unwrap(), Some(50));
        assert_eq!(adapter.get_int("strategy", "long_window").unwrap(), Some(200));
        assert_eq!(
            adapter.get_double("backtest", "initial_cash").unwrap(),
            Some(100000.0)
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[backtest]\ninitial_cash = 100\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_missing_key_is_none() {
        let adapter = FileConfigAdapter::from_string("[strategy]\n").unwrap();
        assert_eq!(adapter.get_int("strategy", "long_window").unwrap(), None);
    }

    #[test]
    fn get_int_rejects_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[strategy]\nshort_window = ten\nlong_window = 20x\n")
                .unwrap();
        for key in ["short_window", "long_window"] {
            let err = adapter.get_int("strategy", key).unwrap_err();
            assert!(
                matches!(err, EngineError::InvalidConfiguration { key: ref k, .. } if k == key)
            );
        }
    }

    #[test]
    fn get_double_rejects_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\ninitial_cash = 5,000\n").unwrap();
        let err = adapter.get_double("backtest", "initial_cash").unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfiguration { ref key, .. } if key == "initial_cash"));
        assert_eq!(adapter.get_double("backtest", "missing").unwrap(), None);
    }

    #[test]
    fn get_date_parses_iso_dates() {
        let adapter = FileConfigAdapter::from_string(
            "[backtest]\nstart_date = 2015-01-01\nend_date = not-a-date\n",
        )
        .unwrap();
        assert_eq!(
            adapter.get_date("backtest", "start_date").unwrap(),
            NaiveDate::from_ymd_opt(2015, 1, 1)
        );
        assert!(adapter.get_date("backtest", "end_date").is_err());
        assert_eq!(adapter.get_date("backtest", "missing").unwrap(), None);
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[report]\noutput = /tmp/equity.csv\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("report", "output"),
            Some("/tmp/equity.csv".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let err = FileConfigAdapter::from_file("/nonexistent/path/config.ini").unwrap_err();
        assert!(matches!(err, EngineError::ConfigParse { .. }));
    }
}
