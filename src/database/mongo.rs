//! MongoDB client settings and connection URI assembly.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::fields::{FieldsError, Setter, TextFields, parse_fields, parse_list, set_port};

/// Text form: `HOST=mongo1|PORT=27017`. Port 0 leaves the port out of the URI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoAddr {
    pub host: String,
    pub port: u16,
}

impl TextFields for MongoAddr {
    const KIND: &'static str = "MongoAddr";
    const FIELDS: &'static [(&'static str, Setter<Self>)] =
        &[("HOST", set_host), ("PORT", set_addr_port)];
}

fn set_host(addr: &mut MongoAddr, value: &str) -> Result<(), ()> {
    addr.host = value.to_owned();
    Ok(())
}

fn set_addr_port(addr: &mut MongoAddr, value: &str) -> Result<(), ()> {
    set_port(&mut addr.port, value)
}

impl FromStr for MongoAddr {
    type Err = FieldsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fields(s)
    }
}

impl MongoAddr {
    pub fn parse_list(text: &str) -> Result<Vec<Self>, FieldsError> {
        parse_list(text)
    }

    fn authority(&self) -> String {
        if self.port == 0 {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    pub debug: bool,
    #[serde(rename = "max_idle_conn")]
    pub max_idle_conns: u64,
    #[serde(rename = "min_idle_conn")]
    pub min_idle_conns: u64,
    /// Duration text such as `90s` or `1m30s`; empty means unset.
    pub max_idle_time: String,
    pub user: String,
    pub passwd: String,
    pub addr: Vec<MongoAddr>,
    pub db: String,
    pub opts: BTreeMap<String, String>,
}

impl std::fmt::Debug for MongoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoConfig")
            .field("debug", &self.debug)
            .field("max_idle_conns", &self.max_idle_conns)
            .field("min_idle_conns", &self.min_idle_conns)
            .field("max_idle_time", &self.max_idle_time)
            .field("user", &self.user)
            .field("addr", &self.addr)
            .field("db", &self.db)
            .field("opts", &self.opts)
            .finish_non_exhaustive()
    }
}

impl MongoConfig {
    /// `mongodb://[user[:passwd]@]host[:port][,host[:port]...]/[db][?k=v;k=v]`
    pub fn uri(&self) -> Result<String, FieldsError> {
        if self.addr.is_empty() {
            return Err(FieldsError::NoAddress);
        }

        let mut uri = String::from("mongodb://");
        if !self.user.is_empty() {
            uri.push_str(&self.user);
            if !self.passwd.is_empty() {
                uri.push(':');
                uri.push_str(&self.passwd);
            }
            uri.push('@');
        }

        let hosts: Vec<String> = self.addr.iter().map(MongoAddr::authority).collect();
        uri.push_str(&hosts.join(","));
        uri.push('/');
        uri.push_str(&self.db);

        if !self.opts.is_empty() {
            let opts: Vec<String> = self.opts.iter().map(|(k, v)| format!("{k}={v}")).collect();
            uri.push('?');
            uri.push_str(&opts.join(";"));
        }

        Ok(uri)
    }

    /// Parsed `max_idle_time`; `None` when unset.
    pub fn max_idle_duration(&self) -> Result<Option<Duration>, FieldsError> {
        if self.max_idle_time.is_empty() {
            return Ok(None);
        }
        parse_duration(&self.max_idle_time)
            .map(Some)
            .ok_or_else(|| FieldsError::InvalidValue {
                key: "max_idle_time",
                value: self.max_idle_time.clone(),
            })
    }
}

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Sequence of `<decimal><unit>` with units h, m, s, ms, us (µs), ns and an
/// optional leading `+`, e.g. `1.5h`, `1h30m`, `+30s`. Negative durations are
/// rejected.
fn parse_duration(text: &str) -> Option<Duration> {
    let text = text.trim();
    if text.starts_with('-') {
        return None;
    }
    let mut rest = text.strip_prefix('+').unwrap_or(text);
    if rest == "0" {
        return Some(Duration::ZERO);
    }
    if rest.is_empty() {
        return None;
    }

    let mut nanos: u128 = 0;
    while !rest.is_empty() {
        let int_len = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let int = &rest[..int_len];
        rest = &rest[int_len..];

        let frac = match rest.strip_prefix('.') {
            Some(after) => {
                let len = after
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(after.len());
                rest = &after[len..];
                &after[..len]
            }
            None => "",
        };
        if int.is_empty() && frac.is_empty() {
            return None;
        }

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit: u128 = match &rest[..unit_len] {
            "h" => 3600 * NANOS_PER_SEC,
            "m" => 60 * NANOS_PER_SEC,
            "s" => NANOS_PER_SEC,
            "ms" => 1_000_000,
            "us" | "µs" | "μs" => 1_000,
            "ns" => 1,
            _ => return None,
        };
        rest = &rest[unit_len..];

        let whole: u128 = if int.is_empty() { 0 } else { int.parse().ok()? };
        let mut part = whole.checked_mul(unit)?;
        if !frac.is_empty() {
            // digits past 18 are below nanosecond precision for every unit
            let frac = &frac[..frac.len().min(18)];
            let scale = 10u128.pow(frac.len() as u32);
            let value: u128 = frac.parse().ok()?;
            part = part.checked_add(value * unit / scale)?;
        }
        nanos = nanos.checked_add(part)?;
    }

    let secs = u64::try_from(nanos / NANOS_PER_SEC).ok()?;
    Some(Duration::new(secs, (nanos % NANOS_PER_SEC) as u32))
}
