use cfgweave_model::{GResult, ValidationError};
use cfgweave_substitution::Transformer;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::str::FromStr;

/// Longest `string(len)` a substitution may generate.
pub const MAX_STRING_LENGTH: usize = 4096;

/// `${random:kind}` or `${random:kind(a,b)}`: a fresh random value.
///
/// Kinds: `int`, `long`, `double` (optional `(min,max)`, max exclusive),
/// `bool`, `byte`, `char`, `string(len)`, `uuid`. String lengths above
/// [`MAX_STRING_LENGTH`] are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTransformer;

impl Transformer for RandomTransformer {
    fn name(&self) -> &str {
        "random"
    }

    fn process(&self, path: &str, key: &str, _raw_value: &str) -> GResult<String> {
        match generate(key.trim()) {
            Some(value) => GResult::ok(value),
            None => GResult::fail_one(ValidationError::InvalidRandomParameter {
                path: path.to_string(),
                parameter: key.to_string(),
            }),
        }
    }
}

fn generate(key: &str) -> Option<String> {
    let (kind, args) = split_args(key)?;
    let mut rng = rand::thread_rng();

    let value = match (kind, args.as_slice()) {
        ("int", []) => rng.gen::<i32>().to_string(),
        ("int", [min, max]) => ranged::<i32>(&mut rng, min, max)?,
        ("long", []) => rng.gen::<i64>().to_string(),
        ("long", [min, max]) => ranged::<i64>(&mut rng, min, max)?,
        ("double", []) => rng.gen::<f64>().to_string(),
        ("double", [min, max]) => {
            let (min, max): (f64, f64) = (min.parse().ok()?, max.parse().ok()?);
            if !(min.is_finite() && max.is_finite() && min < max && (max - min).is_finite()) {
                return None;
            }
            rng.gen_range(min..max).to_string()
        }
        ("bool" | "boolean", []) => rng.gen::<bool>().to_string(),
        ("byte", []) => rng.gen::<i8>().to_string(),
        ("char", []) => char::from(rng.sample(Alphanumeric)).to_string(),
        ("string", [len]) => {
            let len: usize = len.parse().ok().filter(|&n| n <= MAX_STRING_LENGTH)?;
            (&mut rng)
                .sample_iter(Alphanumeric)
                .take(len)
                .map(char::from)
                .collect()
        }
        ("uuid", []) => uuid::Uuid::new_v4().to_string(),
        _ => return None,
    };
    Some(value)
}

/// `int(1,5)` → (`int`, [`1`, `5`]).
fn split_args(key: &str) -> Option<(&str, Vec<&str>)> {
    match key.find('(') {
        None => Some((key, Vec::new())),
        Some(open) => {
            let inner = key[open + 1..].strip_suffix(')')?;
            Some((&key[..open], inner.split(',').map(str::trim).collect()))
        }
    }
}

fn ranged<T>(rng: &mut impl Rng, min: &str, max: &str) -> Option<String>
where
    T: FromStr + PartialOrd + ToString + rand::distributions::uniform::SampleUniform,
{
    let min: T = min.parse().ok()?;
    let max: T = max.parse().ok()?;
    if min >= max {
        return None;
    }
    Some(rng.gen_range(min..max).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random(key: &str) -> GResult<String> {
        RandomTransformer.process("p", key, key)
    }

    #[test]
    fn test_ranged_int() {
        for _ in 0..50 {
            let value: i32 = random("int(5,10)").into_value().unwrap().parse().unwrap();
            assert!((5..10).contains(&value));
        }
    }

    #[test]
    fn test_kinds() {
        assert!(random("long").into_value().unwrap().parse::<i64>().is_ok());
        assert!(random("double(0.5,1.5)").into_value().unwrap().parse::<f64>().is_ok());
        assert!(random("bool").into_value().unwrap().parse::<bool>().is_ok());
        assert!(random("byte").into_value().unwrap().parse::<i8>().is_ok());
        assert_eq!(random("char").into_value().unwrap().chars().count(), 1);
        assert_eq!(random("string(12)").into_value().unwrap().len(), 12);
        assert!(uuid::Uuid::parse_str(&random("uuid").into_value().unwrap()).is_ok());
    }

    #[test]
    fn test_string_length_limit() {
        let longest = format!("string({})", MAX_STRING_LENGTH);
        assert_eq!(random(&longest).into_value().unwrap().len(), MAX_STRING_LENGTH);

        let result = random("string(999999999)");
        assert!(!result.has_results());
        assert!(matches!(
            &result.errors()[0],
            ValidationError::InvalidRandomParameter { parameter, .. } if parameter == "string(999999999)"
        ));
    }

    #[test]
    fn test_invalid_parameters() {
        for key in [
            "int(10,5)",
            "int(a,b)",
            "string",
            "colour",
            "int(1,2",
            "double(NaN,1)",
            "double(-inf,inf)",
            "double(-1e308,1e308)",
        ] {
            let result = random(key);
            assert!(
                matches!(result.errors()[0], ValidationError::InvalidRandomParameter { .. }),
                "{} should be rejected",
                key
            );
        }
    }
}
