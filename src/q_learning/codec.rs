//! Positional text codec for Q-table records
//!
//! A persisted line is the concatenation of a [`State`] (9 fields) and its
//! [`ActionValues`] (4 fields). Each record kind knows its own width and how
//! to read itself starting at an offset, so records compose by position
//! without a shared base type.

use crate::{
    Result,
    error::Error,
    q_learning::{ActionValues, DistanceBucket, State},
};

/// Separators accepted when reading a line
pub const ACCEPTED_SEPARATORS: [char; 2] = [';', ','];

/// Total fields in one persisted line
pub const LINE_FIELDS: usize = State::FIELDS + ActionValues::FIELDS;

/// A record that occupies a fixed number of consecutive fields.
pub trait CsvRecord: Sized {
    /// Number of fields the record occupies
    const FIELDS: usize;

    /// Append the record's fields to `out`
    fn encode(&self, out: &mut Vec<String>);

    /// Decode the record from `fields[offset..offset + FIELDS]`.
    ///
    /// `line` is only used for error reporting. Returns the record and the
    /// number of fields consumed.
    fn decode(fields: &[&str], offset: usize, line: usize) -> Result<(Self, usize)>;
}

/// Canonical text for a boolean field
pub fn format_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

fn field<'a>(fields: &[&'a str], index: usize, line: usize) -> Result<&'a str> {
    fields.get(index).copied().ok_or(Error::FieldCount {
        line,
        expected: index + 1,
        got: fields.len(),
    })
}

fn parse_bool(fields: &[&str], index: usize, line: usize) -> Result<bool> {
    let raw = field(fields, index, line)?;
    if raw.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(Error::InvalidField {
            line,
            field: index + 1,
            value: raw.to_string(),
            expected: "True or False",
        })
    }
}

fn parse_bucket(fields: &[&str], index: usize, line: usize) -> Result<DistanceBucket> {
    let raw = field(fields, index, line)?;
    raw.parse::<usize>()
        .ok()
        .and_then(|ordinal| DistanceBucket::try_from(ordinal).ok())
        .ok_or_else(|| Error::InvalidField {
            line,
            field: index + 1,
            value: raw.to_string(),
            expected: "distance bucket 0, 1 or 2",
        })
}

fn parse_value(fields: &[&str], index: usize, line: usize) -> Result<f64> {
    let raw = field(fields, index, line)?;
    raw.parse::<f64>().map_err(|_| Error::InvalidField {
        line,
        field: index + 1,
        value: raw.to_string(),
        expected: "a decimal number",
    })
}

impl CsvRecord for State {
    const FIELDS: usize = 9;

    fn encode(&self, out: &mut Vec<String>) {
        let flags = [
            self.north_walkable,
            self.east_walkable,
            self.south_walkable,
            self.west_walkable,
            self.other_north,
            self.other_east,
            self.other_south,
            self.other_west,
        ];
        out.extend(flags.iter().map(|&flag| format_bool(flag).to_string()));
        out.push(self.distance.ordinal().to_string());
    }

    fn decode(fields: &[&str], offset: usize, line: usize) -> Result<(Self, usize)> {
        let state = State {
            north_walkable: parse_bool(fields, offset, line)?,
            east_walkable: parse_bool(fields, offset + 1, line)?,
            south_walkable: parse_bool(fields, offset + 2, line)?,
            west_walkable: parse_bool(fields, offset + 3, line)?,
            other_north: parse_bool(fields, offset + 4, line)?,
            other_east: parse_bool(fields, offset + 5, line)?,
            other_south: parse_bool(fields, offset + 6, line)?,
            other_west: parse_bool(fields, offset + 7, line)?,
            distance: parse_bucket(fields, offset + 8, line)?,
        };
        Ok((state, Self::FIELDS))
    }
}

impl CsvRecord for ActionValues {
    const FIELDS: usize = 4;

    fn encode(&self, out: &mut Vec<String>) {
        out.extend(self.0.iter().map(f64::to_string));
    }

    fn decode(fields: &[&str], offset: usize, line: usize) -> Result<(Self, usize)> {
        let mut values = [0.0; 4];
        for (i, value) in values.iter_mut().enumerate() {
            *value = parse_value(fields, offset + i, line)?;
        }
        Ok((ActionValues(values), Self::FIELDS))
    }
}

/// Encode one table entry as a full line of fields
pub fn encode_entry(state: &State, values: &ActionValues) -> Vec<String> {
    let mut out = Vec::with_capacity(LINE_FIELDS);
    state.encode(&mut out);
    values.encode(&mut out);
    out
}

/// Decode one persisted line.
///
/// The line is split on every accepted separator and each field is trimmed.
/// A single empty trailing field is tolerated because older files end each
/// line with a separator.
pub fn decode_line(raw: &str, line: usize) -> Result<(State, ActionValues)> {
    let mut fields: Vec<&str> = raw.split(ACCEPTED_SEPARATORS).map(str::trim).collect();
    if fields.len() > LINE_FIELDS && fields.last().is_some_and(|last| last.is_empty()) {
        fields.pop();
    }
    if fields.len() != LINE_FIELDS {
        return Err(Error::FieldCount {
            line,
            expected: LINE_FIELDS,
            got: fields.len(),
        });
    }

    let (state, consumed) = State::decode(&fields, 0, line)?;
    let (values, _) = ActionValues::decode(&fields, consumed, line)?;
    Ok((state, values))
}
