use serde::Deserialize;
use serde_json::{Map, Value};

use stockroom_core::{DomainError, DomainResult, FieldError};
use stockroom_inventory::{ItemName, NewRecord};

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /items`.
///
/// Fields stay untyped so that every bad one can be reported at once, with
/// its own location, instead of failing on the first serde mismatch.
#[derive(Debug, Default, Deserialize)]
pub struct CreateItemRequest {
    pub item: Option<Value>,
    pub quantity: Option<Value>,
    pub notes: Option<Value>,
}

/// Query string of `PATCH`/`PUT /items/{item}`.
#[derive(Debug, Default, Deserialize)]
pub struct QuantityParams {
    pub change: Option<String>,
    pub new_quantity: Option<String>,
}

/// JSON body alternative to [`QuantityParams`].
#[derive(Debug, Default, Deserialize)]
pub struct QuantityBody {
    pub change: Option<Value>,
    pub new_quantity: Option<Value>,
}

/// Which integer parameter a quantity endpoint takes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum QuantityField {
    Change,
    NewQuantity,
}

impl QuantityField {
    pub fn name(self) -> &'static str {
        match self {
            QuantityField::Change => "change",
            QuantityField::NewQuantity => "new_quantity",
        }
    }
}

impl QuantityParams {
    fn get(&self, field: QuantityField) -> Option<&str> {
        match field {
            QuantityField::Change => self.change.as_deref(),
            QuantityField::NewQuantity => self.new_quantity.as_deref(),
        }
    }
}

impl QuantityBody {
    fn get(&self, field: QuantityField) -> Option<&Value> {
        match field {
            QuantityField::Change => self.change.as_ref(),
            QuantityField::NewQuantity => self.new_quantity.as_ref(),
        }
    }
}

// -------------------------
// Validation
// -------------------------

/// Parse and validate a create-or-replace body:
/// `{"item": string, "quantity": integer, "notes"?: string}`.
///
/// Reports every bad field at once rather than stopping at the first.
pub fn parse_create_item(body: &[u8]) -> DomainResult<NewRecord> {
    let Some(fields) = parse_json(body)?.as_object().cloned() else {
        return Err(not_an_object());
    };
    let request: CreateItemRequest = from_fields(fields)?;
    request.validate()
}

impl CreateItemRequest {
    pub fn validate(self) -> DomainResult<NewRecord> {
        let mut errors = Vec::new();

        let item = match self.item {
            None => {
                errors.push(FieldError::missing(["body", "item"]));
                None
            }
            Some(Value::String(raw)) => match ItemName::parse(raw) {
                Ok(name) => Some(name),
                Err(e) => {
                    errors.extend(e.field_errors().iter().cloned().map(|f| f.within("body")));
                    None
                }
            },
            Some(_) => {
                errors.push(FieldError::new(["body", "item"], "Input should be a valid string", "string_type"));
                None
            }
        };

        let quantity = match self.quantity {
            None => {
                errors.push(FieldError::missing(["body", "quantity"]));
                None
            }
            Some(v) => match json_integer(&v) {
                Ok(q) => Some(q),
                Err(e) => {
                    errors.push(e.within_field("body", "quantity"));
                    None
                }
            },
        };

        let notes = match self.notes {
            None => None,
            Some(Value::String(s)) => Some(s),
            Some(_) => {
                errors.push(FieldError::new(["body", "notes"], "Input should be a valid string", "string_type"));
                None
            }
        };

        match (item, quantity) {
            (Some(item), Some(quantity)) if errors.is_empty() => Ok(NewRecord::new(item, quantity, notes)),
            _ => Err(DomainError::validation(errors)),
        }
    }
}

/// Read the integer parameter `field` from the query string, falling back to
/// a JSON object body (`PATCH /items/bolt?change=-3` or `{"change": -3}`).
pub fn int_param(field: QuantityField, query: &QuantityParams, body: &[u8]) -> DomainResult<i64> {
    let name = field.name();

    if let Some(raw) = query.get(field) {
        return raw.trim().parse::<i64>().map_err(|_| {
            DomainError::invalid_field(FieldError::new(
                ["query", name],
                "Input should be a valid integer, unable to parse string as an integer",
                "int_parsing",
            ))
        });
    }

    if let Some(fields) = body_object(body)? {
        let params: QuantityBody = from_fields(fields)?;
        if let Some(v) = params.get(field) {
            return json_integer(v).map_err(|e| DomainError::invalid_field(e.within_field("body", name)));
        }
    }

    Err(DomainError::invalid_field(FieldError::missing(["query", name])))
}

fn parse_json(body: &[u8]) -> DomainResult<Value> {
    serde_json::from_slice(body).map_err(|e| {
        DomainError::invalid_field(FieldError::new(["body"], format!("JSON decode error: {e}"), "json_invalid"))
    })
}

/// Deserialize a DTO from an already-checked JSON object.
fn from_fields<T: serde::de::DeserializeOwned>(fields: Map<String, Value>) -> DomainResult<T> {
    serde_json::from_value(Value::Object(fields)).map_err(|e| {
        DomainError::invalid_field(FieldError::new(["body"], e.to_string(), "model_attributes_type"))
    })
}

fn not_an_object() -> DomainError {
    DomainError::invalid_field(FieldError::new(
        ["body"],
        "Input should be a valid dictionary or object",
        "model_attributes_type",
    ))
}

/// `None` for an empty body; an error for a body that is present but is not
/// a JSON object.
fn body_object(body: &[u8]) -> DomainResult<Option<Map<String, Value>>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    match parse_json(body)? {
        Value::Object(fields) => Ok(Some(fields)),
        Value::Null => Ok(None),
        _ => Err(not_an_object()),
    }
}

/// Why a JSON value was not accepted as an `i64`.
struct IntError {
    msg: &'static str,
    kind: &'static str,
}

impl IntError {
    fn within_field(self, source: &str, field: &str) -> FieldError {
        FieldError::new([source, field], self.msg, self.kind)
    }
}

fn json_integer(value: &Value) -> Result<i64, IntError> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else if n.is_u64() {
                Err(IntError {
                    msg: "Input should be a valid integer, number out of range",
                    kind: "int_out_of_range",
                })
            } else {
                Err(IntError {
                    msg: "Input should be a valid integer, got a number with a fractional part",
                    kind: "int_from_float",
                })
            }
        }
        _ => Err(IntError {
            msg: "Input should be a valid integer",
            kind: "int_type",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields_of(err: DomainError) -> Vec<FieldError> {
        err.field_errors().to_vec()
    }

    fn locs(err: DomainError) -> Vec<Vec<String>> {
        fields_of(err).into_iter().map(|f| f.loc).collect()
    }

    fn loc(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    fn query(pairs: &[(&str, &str)]) -> QuantityParams {
        let mut params = QuantityParams::default();
        for (k, v) in pairs {
            match *k {
                "change" => params.change = Some(v.to_string()),
                "new_quantity" => params.new_quantity = Some(v.to_string()),
                other => panic!("unexpected query key {other}"),
            }
        }
        params
    }

    #[test]
    fn accepts_a_full_body() {
        let record = parse_create_item(br#"{"item": "bolt", "quantity": 10, "notes": "aisle 3"}"#).unwrap();
        assert_eq!(record.item().as_str(), "bolt");
        assert_eq!(record.quantity(), 10);
        assert_eq!(record.notes(), "aisle 3");
    }

    #[test]
    fn notes_are_optional() {
        let record = parse_create_item(br#"{"item": "bolt", "quantity": -2}"#).unwrap();
        assert_eq!(record.notes(), "");
        assert_eq!(record.quantity(), -2);

        let record = parse_create_item(br#"{"item": "bolt", "quantity": 1, "notes": null}"#).unwrap();
        assert_eq!(record.notes(), "");
    }

    #[test]
    fn reports_every_missing_field() {
        let err = parse_create_item(b"{}").unwrap_err();
        assert_eq!(locs(err), vec![loc(&["body", "item"]), loc(&["body", "quantity"])]);
    }

    #[test]
    fn rejects_wrongly_typed_fields() {
        let err = parse_create_item(br#"{"item": 7, "quantity": "ten", "notes": []}"#).unwrap_err();
        let fields = fields_of(err);
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].kind, "string_type");
        assert_eq!(fields[1].kind, "int_type");
        assert_eq!(fields[2].loc, loc(&["body", "notes"]));
    }

    #[test]
    fn rejects_fractional_and_oversized_quantities() {
        let err = parse_create_item(br#"{"item": "bolt", "quantity": 1.5}"#).unwrap_err();
        assert_eq!(fields_of(err)[0].kind, "int_from_float");

        let err = parse_create_item(br#"{"item": "bolt", "quantity": 18446744073709551615}"#).unwrap_err();
        assert_eq!(fields_of(err)[0].kind, "int_out_of_range");
    }

    #[test]
    fn rejects_blank_item_names() {
        let err = parse_create_item(br#"{"item": "  ", "quantity": 1}"#).unwrap_err();
        assert_eq!(locs(err), vec![loc(&["body", "item"])]);
    }

    #[test]
    fn rejects_non_object_and_non_json_bodies() {
        assert_eq!(locs(parse_create_item(b"[1, 2]").unwrap_err()), vec![loc(&["body"])]);
        let fields = fields_of(parse_create_item(b"item=bolt").unwrap_err());
        assert_eq!(fields[0].kind, "json_invalid");
        assert_eq!(fields_of(parse_create_item(b"").unwrap_err())[0].kind, "json_invalid");
    }

    #[test]
    fn create_request_deserializes_absent_fields_as_none() {
        let request: CreateItemRequest = serde_json::from_str(r#"{"item": "bolt", "extra": true}"#).unwrap();
        assert_eq!(request.item, Some(Value::String("bolt".to_string())));
        assert!(request.quantity.is_none());
        assert!(request.notes.is_none());

        let err = request.validate().unwrap_err();
        assert_eq!(locs(err), vec![loc(&["body", "quantity"])]);
    }

    #[test]
    fn query_param_ignores_the_other_field() {
        let params = query(&[("new_quantity", "5")]);
        let fields = fields_of(int_param(QuantityField::Change, &params, b"").unwrap_err());
        assert_eq!(fields[0].kind, "missing");
        assert_eq!(int_param(QuantityField::NewQuantity, &params, b"").unwrap(), 5);
    }

    #[test]
    fn int_param_prefers_the_query_string() {
        let value = int_param(QuantityField::Change, &query(&[("change", "-3")]), br#"{"change": 99}"#).unwrap();
        assert_eq!(value, -3);
    }

    #[test]
    fn int_param_falls_back_to_the_body() {
        assert_eq!(int_param(QuantityField::Change, &query(&[]), br#"{"change": -3}"#).unwrap(), -3);
        assert_eq!(int_param(QuantityField::NewQuantity, &query(&[]), br#"{"new_quantity": 100}"#).unwrap(), 100);
    }

    #[test]
    fn int_param_missing_everywhere_is_a_missing_query_field() {
        let fields = fields_of(int_param(QuantityField::Change, &query(&[]), b"").unwrap_err());
        assert_eq!(fields[0].loc, loc(&["query", "change"]));
        assert_eq!(fields[0].kind, "missing");

        let fields = fields_of(int_param(QuantityField::Change, &query(&[]), br#"{"delta": 1}"#).unwrap_err());
        assert_eq!(fields[0].kind, "missing");
    }

    #[test]
    fn int_param_rejects_malformed_values() {
        let fields = fields_of(int_param(QuantityField::Change, &query(&[("change", "lots")]), b"").unwrap_err());
        assert_eq!(fields[0].loc, loc(&["query", "change"]));
        assert_eq!(fields[0].kind, "int_parsing");

        let fields = fields_of(int_param(QuantityField::Change, &query(&[]), br#"{"change": "3"}"#).unwrap_err());
        assert_eq!(fields[0].loc, loc(&["body", "change"]));
        assert_eq!(fields[0].kind, "int_type");

        let fields = fields_of(int_param(QuantityField::Change, &query(&[]), b"not json").unwrap_err());
        assert_eq!(fields[0].loc, loc(&["body"]));
    }
}
