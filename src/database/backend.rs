//! SQL backend settings: hosts for the source / replica sets and pool sizing.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::fields::{FieldsError, Setter, TextFields, parse_fields, parse_list, set_port};

/// One SQL server. Text form: `HOST=db1|PORT=3306|DB=app|USER=root|PASSWD=pw`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendInfo {
    pub host: String,
    pub port: u16,
    pub db: String,
    pub user: String,
    pub passwd: String,
}

impl TextFields for BackendInfo {
    const KIND: &'static str = "backend info";
    const FIELDS: &'static [(&'static str, Setter<Self>)] = &[
        ("HOST", set_host),
        ("PORT", set_backend_port),
        ("DB", set_db),
        ("USER", set_user),
        ("PASSWD", set_passwd),
    ];
}

fn set_host(info: &mut BackendInfo, value: &str) -> Result<(), ()> {
    info.host = value.to_owned();
    Ok(())
}

fn set_backend_port(info: &mut BackendInfo, value: &str) -> Result<(), ()> {
    set_port(&mut info.port, value)
}

fn set_db(info: &mut BackendInfo, value: &str) -> Result<(), ()> {
    info.db = value.to_owned();
    Ok(())
}

fn set_user(info: &mut BackendInfo, value: &str) -> Result<(), ()> {
    info.user = value.to_owned();
    Ok(())
}

fn set_passwd(info: &mut BackendInfo, value: &str) -> Result<(), ()> {
    info.passwd = value.to_owned();
    Ok(())
}

impl FromStr for BackendInfo {
    type Err = FieldsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fields(s)
    }
}

impl BackendInfo {
    /// Comma separated list, e.g. the value of a `REPLICAS` variable.
    pub fn parse_list(text: &str) -> Result<Vec<Self>, FieldsError> {
        parse_list(text)
    }

    pub fn mysql_dsn(&self) -> String {
        format!(
            "{}:{}@tcp({}:{})/{}?charset=utf8mb4&parseTime=True&loc=Local",
            self.user, self.passwd, self.host, self.port, self.db
        )
    }
}

impl std::fmt::Debug for BackendInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendInfo")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("db", &self.db)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceInfo {
    /// Run schema migration against the sources at startup.
    pub migrate: bool,
    pub infos: Vec<BackendInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub debug: bool,
    pub max_idle_conn: u32,
    pub max_open_conn: u32,
    pub sources: Option<SourceInfo>,
    pub replicas: Vec<BackendInfo>,
}

impl BackendConfig {
    /// DSNs of the write set; empty when no source is configured.
    pub fn source_dsns(&self) -> Vec<String> {
        self.sources
            .iter()
            .flat_map(|s| s.infos.iter())
            .map(BackendInfo::mysql_dsn)
            .collect()
    }

    pub fn replica_dsns(&self) -> Vec<String> {
        self.replicas.iter().map(BackendInfo::mysql_dsn).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_key() {
        let info: BackendInfo = "HOST=db1|PORT=3306|DB=app|USER=root|PASSWD=p=w"
            .parse()
            .unwrap();

        assert_eq!(info.host, "db1");
        assert_eq!(info.port, 3306);
        assert_eq!(info.db, "app");
        assert_eq!(info.user, "root");
        assert_eq!(info.passwd, "p=w");
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let info: BackendInfo = "HOST=db1|CHARSET=latin1".parse().unwrap();
        assert_eq!(info.host, "db1");
        assert_eq!(info.port, 0);
    }

    #[test]
    fn part_without_separator_fails() {
        let err = "HOST=db1|oops".parse::<BackendInfo>().unwrap_err();
        assert_eq!(err.to_string(), "invalid backend info: oops");
    }

    #[test]
    fn non_numeric_port_fails() {
        let err = "PORT=abc".parse::<BackendInfo>().unwrap_err();
        assert_eq!(
            err,
            FieldsError::InvalidValue {
                key: "PORT",
                value: "abc".into()
            }
        );
    }

    #[test]
    fn parses_lists() {
        let list = BackendInfo::parse_list("HOST=a|PORT=1, HOST=b|PORT=2").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].host, "b");
        assert!(BackendInfo::parse_list("  ").unwrap().is_empty());
    }

    #[test]
    fn builds_mysql_dsn() {
        let info: BackendInfo = "HOST=db1|PORT=3306|DB=app|USER=root|PASSWD=pw"
            .parse()
            .unwrap();
        assert_eq!(
            info.mysql_dsn(),
            "root:pw@tcp(db1:3306)/app?charset=utf8mb4&parseTime=True&loc=Local"
        );
    }

    #[test]
    fn config_collects_dsns() {
        let config: BackendConfig = serde_json::from_value(serde_json::json!({
            "max_open_conn": 10,
            "sources": {"migrate": true, "infos": [{"host": "w", "port": 1, "db": "d"}]},
            "replicas": [{"host": "r", "port": 2, "db": "d"}]
        }))
        .unwrap();

        assert_eq!(config.source_dsns().len(), 1);
        assert!(config.replica_dsns()[0].contains("@tcp(r:2)/d"));
        assert!(config.sources.unwrap().migrate);
    }

    #[test]
    fn debug_hides_password() {
        let info: BackendInfo = "PASSWD=hunter2".parse().unwrap();
        assert!(!format!("{info:?}").contains("hunter2"));
    }
}
