use tracing::warn;

use crate::grid::Attrs;

/// Attribute keys consulted for the nodata sentinel, in priority order
pub const NODATA_ATTRS: [&str; 3] = ["_FillValue", "missing_value", "fill_value"];

/// First non-null numeric nodata marker among `NODATA_ATTRS`
pub fn resolve_nodata(attrs: &Attrs) -> Option<f64> {
    for key in NODATA_ATTRS {
        let Some(value) = attrs.get(key) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        match value.as_f64() {
            Some(v) => return Some(v),
            None => warn!("Ignoring non-numeric nodata attribute {}={}", key, value),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::AttrValue;

    fn attrs(pairs: &[(&str, AttrValue)]) -> Attrs {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_priority_order() {
        let a = attrs(&[
            ("fill_value", AttrValue::Int(1)),
            ("missing_value", AttrValue::Int(2)),
            ("_FillValue", AttrValue::Float(3.5)),
        ]);
        assert_eq!(resolve_nodata(&a), Some(3.5));

        let a = attrs(&[
            ("fill_value", AttrValue::Int(1)),
            ("missing_value", AttrValue::Int(2)),
        ]);
        assert_eq!(resolve_nodata(&a), Some(2.0));
    }

    #[test]
    fn test_skips_null_and_non_numeric() {
        let a = attrs(&[
            ("_FillValue", AttrValue::Null),
            ("missing_value", AttrValue::from("none")),
            ("fill_value", AttrValue::from("-32768")),
        ]);
        assert_eq!(resolve_nodata(&a), Some(-32768.0));
    }

    #[test]
    fn test_zero_is_a_valid_sentinel() {
        let a = attrs(&[("_FillValue", AttrValue::Int(0))]);
        assert_eq!(resolve_nodata(&a), Some(0.0));
    }

    #[test]
    fn test_absent() {
        assert_eq!(resolve_nodata(&Attrs::new()), None);
    }
}
