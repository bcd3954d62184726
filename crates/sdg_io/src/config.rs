//! Flat key-value properties loader for the run configuration described in
//! spec.md §6: `application.*`, `common.master.seed`, and per-type
//! `partitioning.<T>.*` entries. Grounded in the teacher's
//! resolve-then-validate `manifest` pipeline (read → parse → cross-check →
//! typed struct), but over `key = value` properties text rather than JSON,
//! since that is the literal format spec.md §6 names.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};

/// `application.output-type`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputType {
    File,
    Socket,
    Void,
}

impl std::str::FromStr for OutputType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(OutputType::File),
            "socket" => Ok(OutputType::Socket),
            "void" => Ok(OutputType::Void),
            other => Err(ConfigError::UnknownOutputType(other.to_string())),
        }
    }
}

/// `partitioning.<T>.*`: how a record type's global cardinality is derived
/// and split across nodes, per spec.md §3 "Partition".
#[derive(Clone, Debug, PartialEq)]
pub enum Partitioning {
    /// All records on node 0; cardinality independent of scaling factor.
    Fixed { cardinality: u64 },
    /// `cardinality = round(scaling_factor * base_cardinality)`, evenly split.
    Linear { base_cardinality: u64 },
    /// Cardinality derived from a parent type's cardinality (resolved by the
    /// engine once every type's base cardinality is known).
    Nested { parent_type: String, factor: f64 },
}

/// The fully parsed, typed configuration: the result of loading the raw
/// key-value map and cross-checking it against spec.md §6's key set.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub scaling_factor: f64,
    pub node_id: u32,
    pub node_count: u32,
    pub output_base: PathBuf,
    pub output_type: OutputType,
    pub output_port: Option<u16>,
    pub job_id: String,
    pub config_dir: PathBuf,
    pub master_seed: Vec<u64>,
    pub partitioning: BTreeMap<String, Partitioning>,
}

/// Raw property map plus the cross-checks that turn it into a [`Config`].
pub fn load(text: &str) -> ConfigResult<Config> {
    let raw = parse_properties(text)?;
    resolve(raw)
}

pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::InvalidValue {
        key: "config-dir".into(),
        value: path.display().to_string(),
        reason: e.to_string(),
    })?;
    load(&text)
}

fn parse_properties(text: &str) -> ConfigResult<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    for (i, raw_line) in text.lines().enumerate() {
        let line = raw_line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(ConfigError::MalformedLine {
                line: (i + 1) as u32,
                text: raw_line.to_string(),
            });
        };
        let key = key.trim().to_string();
        let value = value.trim().to_string();
        if map.insert(key.clone(), value).is_some() {
            return Err(ConfigError::DuplicateRegistration(key));
        }
    }
    Ok(map)
}

fn require<'a>(map: &'a BTreeMap<String, String>, key: &str) -> ConfigResult<&'a str> {
    map.get(key)
        .map(String::as_str)
        .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: "cannot parse".to_string(),
    })
}

fn resolve(map: BTreeMap<String, String>) -> ConfigResult<Config> {
    let scaling_factor: f64 = parse_value(
        "application.scaling-factor",
        require(&map, "application.scaling-factor")?,
    )?;
    if scaling_factor < 1.0 {
        return Err(ConfigError::ScalingFactorOutOfRange(scaling_factor));
    }

    let node_id = parse_value("application.node-id", require(&map, "application.node-id")?)?;
    let node_count = parse_value(
        "application.node-count",
        require(&map, "application.node-count")?,
    )?;
    let output_base = PathBuf::from(require(&map, "application.output-base")?);
    let output_type: OutputType =
        require(&map, "application.output-type")?.parse()?;
    let output_port = match map.get("application.output-port") {
        Some(v) => Some(parse_value("application.output-port", v)?),
        None => None,
    };
    if output_type == OutputType::Socket && output_port.is_none() {
        return Err(ConfigError::MissingKey("application.output-port".into()));
    }
    let job_id = require(&map, "application.job-id")?.to_string();
    let config_dir = PathBuf::from(require(&map, "application.config-dir")?);

    let seed_str = require(&map, "common.master.seed")?;
    let master_seed: Vec<u64> = seed_str
        .split(',')
        .map(|s| parse_value("common.master.seed", s.trim()))
        .collect::<ConfigResult<_>>()?;
    if master_seed.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: "common.master.seed".into(),
            value: seed_str.to_string(),
            reason: "must contain at least one component".into(),
        });
    }

    let mut partitioning = BTreeMap::new();
    for key in map.keys() {
        let Some(rest) = key.strip_prefix("partitioning.") else {
            continue;
        };
        let Some((type_name, field)) = rest.split_once('.') else {
            continue;
        };
        if partitioning.contains_key(type_name) {
            continue;
        }
        let entry = if field == "cardinality" {
            let v: u64 = parse_value(key, &map[key])?;
            Partitioning::Fixed { cardinality: v }
        } else if field == "base-cardinality" {
            let v: u64 = parse_value(key, &map[key])?;
            Partitioning::Linear { base_cardinality: v }
        } else if field == "parent" {
            let parent_type = map[key].clone();
            let factor_key = format!("partitioning.{type_name}.factor");
            let factor = match map.get(&factor_key) {
                Some(v) => parse_value(&factor_key, v)?,
                None => 1.0,
            };
            Partitioning::Nested { parent_type, factor }
        } else {
            continue;
        };
        partitioning.insert(type_name.to_string(), entry);
    }

    Ok(Config {
        scaling_factor,
        node_id,
        node_count,
        output_base,
        output_type,
        output_port,
        job_id,
        config_dir,
        master_seed,
        partitioning,
    })
}
