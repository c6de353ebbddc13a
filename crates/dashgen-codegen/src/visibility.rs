//! Runtime visibility guards.
//!
//! A widget's condition is never evaluated here. It is spelled as a C++
//! boolean expression that the firmware evaluates each refresh. Every entity
//! test also checks that the entity has a state, so an unavailable entity
//! reads as "condition false" rather than comparing garbage.

use dashgen_types::{CompareOp, Condition};

use crate::instr::cpp_string;
use crate::resources::{EntityDomain, Resources, SourceRef};

/// `20.0f`, `0.5f`.
pub fn float_literal(v: f64) -> String {
    format!("{v:?}f")
}

/// C++ expression for a condition.
pub fn guard_expr(cond: &Condition, resources: &Resources) -> String {
    match cond {
        Condition::State { entity, op, value } => match resources.entity_source(entity) {
            Some(source) => state_test(source, *op, value),
            None => "false".to_string(),
        },
        Condition::Range { entity, min, max } => match resources.entity_source(entity) {
            Some(source) => range_test(source, *min, *max),
            None => "false".to_string(),
        },
        Condition::All { conditions } => join(conditions, " && ", "true", resources),
        Condition::Any { conditions } => join(conditions, " || ", "false", resources),
        Condition::Not { condition } => format!("!({})", guard_expr(condition, resources)),
    }
}

/// Body of a declarative `hidden` lambda: hidden when the condition fails.
pub fn hidden_lambda(cond: &Condition, resources: &Resources) -> String {
    format!("return !({});", guard_expr(cond, resources))
}

fn join(conditions: &[Condition], sep: &str, empty: &str, resources: &Resources) -> String {
    match conditions {
        [] => empty.to_string(),
        [only] => guard_expr(only, resources),
        many => {
            let parts: Vec<String> = many.iter().map(|c| guard_expr(c, resources)).collect();
            format!("({})", parts.join(sep))
        }
    }
}

fn truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "on" | "true" | "1" | "yes" | "home" | "open"
    )
}

fn state_test(source: &SourceRef, op: CompareOp, value: &str) -> String {
    let avail = source.available();
    let state = source.value();
    match source.domain {
        EntityDomain::Numeric => match value.trim().parse::<f64>() {
            Ok(n) => format!("({avail} && {state} {op} {})", float_literal(n)),
            Err(_) => {
                let absent = matches!(value.trim(), "" | "unknown" | "unavailable");
                match (absent, op) {
                    (true, CompareOp::Eq) => format!("!({avail})"),
                    (true, CompareOp::Ne) => format!("({avail})"),
                    _ => "false".to_string(),
                }
            }
        },
        EntityDomain::Binary => format!("({avail} && {state} {op} {})", truthy(value)),
        EntityDomain::Text => format!("({avail} && {state} {op} {})", cpp_string(value)),
    }
}

fn range_test(source: &SourceRef, min: Option<f64>, max: Option<f64>) -> String {
    let value = match source.domain {
        EntityDomain::Numeric => source.value(),
        EntityDomain::Text => format!("atof({}.c_str())", source.value()),
        EntityDomain::Binary => return "false".to_string(),
    };
    let mut parts = vec![source.available()];
    if let Some(lo) = min {
        parts.push(format!("{value} >= {}", float_literal(lo)));
    }
    if let Some(hi) = max {
        parts.push(format!("{value} <= {}", float_literal(hi)));
    }
    format!("({})", parts.join(" && "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resources() -> Resources {
        let mut r = Resources::new();
        r.request_entity("sensor.temp");
        r.request_entity("binary_sensor.door");
        r.request_entity("weather.home");
        r
    }

    #[test]
    fn numeric_state() {
        let r = resources();
        let c = Condition::state("sensor.temp", CompareOp::Gt, "20");
        assert_eq!(
            guard_expr(&c, &r),
            "(id(ha_sensor_temp).has_state() && !isnan(id(ha_sensor_temp).state) && id(ha_sensor_temp).state > 20.0f)"
        );
    }

    #[test]
    fn binary_and_text_state() {
        let r = resources();
        let c = Condition::state("binary_sensor.door", CompareOp::Eq, "on");
        assert_eq!(
            guard_expr(&c, &r),
            "(id(ha_binary_sensor_door).has_state() && id(ha_binary_sensor_door).state == true)"
        );
        let c = Condition::state("weather.home", CompareOp::Ne, "rainy");
        assert_eq!(
            guard_expr(&c, &r),
            r#"(id(ha_weather_home).has_state() && id(ha_weather_home).state != "rainy")"#
        );
    }

    #[test]
    fn range_bounds() {
        let r = resources();
        let c = Condition::range("sensor.temp", Some(18.0), Some(22.5));
        let e = guard_expr(&c, &r);
        assert!(e.ends_with("id(ha_sensor_temp).state >= 18.0f && id(ha_sensor_temp).state <= 22.5f)"));
    }

    #[test]
    fn combinators() {
        let r = resources();
        assert_eq!(guard_expr(&Condition::All { conditions: vec![] }, &r), "true");
        assert_eq!(guard_expr(&Condition::Any { conditions: vec![] }, &r), "false");

        let door = Condition::state("binary_sensor.door", CompareOp::Eq, "on");
        let any = Condition::Any {
            conditions: vec![door.clone(), door.clone().negate()],
        };
        let e = guard_expr(&any, &r);
        assert!(e.starts_with("((id(ha_binary_sensor_door)"));
        assert!(e.contains(" || !((id(ha_binary_sensor_door)"));
    }

    #[test]
    fn undeclared_entity_is_false() {
        let r = Resources::new();
        let c = Condition::state("sensor.nowhere", CompareOp::Eq, "1");
        assert_eq!(guard_expr(&c, &r), "false");
        assert_eq!(hidden_lambda(&c, &r), "return !(false);");
    }
}
