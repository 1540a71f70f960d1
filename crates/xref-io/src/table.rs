//! Table reading and writing
//!
//! A table is a list of records (objects) stored as JSON or YAML. Records are
//! mapped onto the cross-reference schema through [`FieldNames`].

use crate::config::FieldNames;
use crate::error::{LoadError, LoadResult};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;
use xref_core::{CrossReferenceRow, GroupKey, MemberEntity, MemberKey, OutputUnit, ResolvedMapping};

/// One table record
pub type Record = Map<String, Value>;

/// On-disk table format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// `.json`
    Json,
    /// `.yaml` / `.yml`
    Yaml,
}

impl TableFormat {
    /// Detect format from file extension
    ///
    /// # Errors
    /// Returns [`LoadError::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &Path) -> LoadResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(LoadError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Read every record of a table
///
/// # Errors
/// Returns error if the file cannot be read or is not a list of objects.
pub fn read_records(path: &Path) -> LoadResult<Vec<Record>> {
    let format = TableFormat::from_path(path)?;
    let text = std::fs::read_to_string(path).map_err(|e| LoadError::io_error(path, e))?;

    let value: Value = match format {
        TableFormat::Json => serde_json::from_str(&text).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })?,
        TableFormat::Yaml => serde_yaml::from_str(&text).map_err(|source| LoadError::Yaml {
            path: path.to_path_buf(),
            source,
        })?,
    };

    let Value::Array(items) = value else {
        return Err(LoadError::NotATable {
            path: path.to_path_buf(),
        });
    };
    let records = items
        .into_iter()
        .map(|item| match item {
            Value::Object(record) => Ok(record),
            _ => Err(LoadError::NotATable {
                path: path.to_path_buf(),
            }),
        })
        .collect::<LoadResult<Vec<_>>>()?;

    tracing::info!(path = %path.display(), records = records.len(), "records loaded");
    Ok(records)
}

/// Write serializable content in the format implied by the extension
///
/// # Errors
/// Returns error if the content cannot be serialized or the file written.
pub fn write_table<T: Serialize + ?Sized>(path: &Path, content: &T) -> LoadResult<()> {
    let text = match TableFormat::from_path(path)? {
        TableFormat::Json => serde_json::to_string_pretty(content).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })?,
        TableFormat::Yaml => serde_yaml::to_string(content).map_err(|source| LoadError::Yaml {
            path: path.to_path_buf(),
            source,
        })?,
    };
    std::fs::write(path, text).map_err(|e| LoadError::io_error(path, e))?;
    tracing::debug!(path = %path.display(), "table written");
    Ok(())
}

/// Scalar cell as text; `None` for null
fn scalar_text(record: usize, field: &str, value: &Value) -> LoadResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => Err(LoadError::invalid_field(
            record,
            field,
            "expected a string or number",
        )),
    }
}

/// Map cross-reference records to rows
///
/// A null group key becomes a blank key and a null or absent member list
/// becomes `None`; the resolver reports both as malformed rows. A member list
/// stored as an array is joined with spaces.
///
/// # Errors
/// Returns [`LoadError::MissingField`] if the group key column is absent.
pub fn cross_reference_rows(records: &[Record], fields: &FieldNames) -> LoadResult<Vec<CrossReferenceRow>> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let group = record
                .get(&fields.group_key)
                .ok_or_else(|| LoadError::MissingField {
                    record: index,
                    field: fields.group_key.clone(),
                })?;
            let group_key = scalar_text(index, &fields.group_key, group)?.unwrap_or_default();

            let member_keys_raw = match record.get(&fields.member_list) {
                None => None,
                Some(Value::Array(items)) => {
                    let parts = items
                        .iter()
                        .map(|v| scalar_text(index, &fields.member_list, v))
                        .collect::<LoadResult<Vec<_>>>()?;
                    Some(parts.into_iter().flatten().collect::<Vec<_>>().join(" "))
                }
                Some(value) => scalar_text(index, &fields.member_list, value)?,
            };

            Ok(CrossReferenceRow {
                group_key: GroupKey::new(group_key.trim()),
                member_keys_raw,
            })
        })
        .collect()
}

/// Map member records to entities
///
/// The group key column, if present, is dropped: the join recomputes it.
/// All other columns are kept as attributes.
///
/// # Errors
/// Returns error if a record has no usable member key.
pub fn member_entities(records: &[Record], fields: &FieldNames) -> LoadResult<Vec<MemberEntity>> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let mut attributes = record.clone();
            let key = attributes
                .remove(&fields.member_key)
                .ok_or_else(|| LoadError::MissingField {
                    record: index,
                    field: fields.member_key.clone(),
                })?;
            let key = scalar_text(index, &fields.member_key, &key)?
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .ok_or_else(|| LoadError::invalid_field(index, &fields.member_key, "member key is empty"))?;
            attributes.remove(&fields.group_key);

            Ok(MemberEntity::new(MemberKey::new(key)).with_attributes(attributes))
        })
        .collect()
}

/// Exploded mapping as records, one per member
#[must_use]
pub fn explode_records(mapping: &ResolvedMapping, fields: &FieldNames) -> Vec<Record> {
    mapping
        .to_rows()
        .into_iter()
        .map(|(member, group)| {
            let mut record = Record::new();
            record.insert(fields.member_key.clone(), Value::from(member.as_str()));
            record.insert(fields.group_key.clone(), Value::from(group.as_str()));
            record
        })
        .collect()
}

/// Members as records with the group key column written back
#[must_use]
pub fn grouped_member_records(members: &[MemberEntity], fields: &FieldNames) -> Vec<Record> {
    members
        .iter()
        .map(|member| {
            let mut record = Record::new();
            record.insert(fields.member_key.clone(), Value::from(member.member_key.as_str()));
            record.extend(member.attributes.clone());
            let group = member
                .group_key
                .as_ref()
                .map_or(Value::Null, |g| Value::from(g.as_str()));
            record.insert(fields.group_key.clone(), group);
            record
        })
        .collect()
}

/// Output units as records
#[must_use]
pub fn unit_records(units: &[OutputUnit], fields: &FieldNames) -> Vec<Record> {
    units
        .iter()
        .map(|unit| {
            let mut record = Record::new();
            record.insert(fields.group_key.clone(), Value::from(unit.group_key.as_str()));
            record.insert("member_count".to_string(), Value::from(unit.size()));
            record.insert(
                "members".to_string(),
                unit.member_keys.iter().map(|m| Value::from(m.as_str())).collect(),
            );
            record
        })
        .collect()
}
