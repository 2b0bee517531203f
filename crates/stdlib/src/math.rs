use async_trait::async_trait;
use harvest_core::{Result, Value, ValueType};

use crate::validation::{validate_args, validate_type};
use crate::{Function, FunctionContext, FunctionSchema};

/// Greatest number in an array, as a float. An empty array or one holding
/// anything but numbers yields none.
pub struct MaxFunction;

#[async_trait]
impl Function for MaxFunction {
    fn schema(&self) -> FunctionSchema {
        FunctionSchema {
            name: "MAX",
            description: "Greatest of the numbers in an array.",
            min_args: 1,
            max_args: 1,
        }
    }

    async fn call(&self, _ctx: &FunctionContext, args: &[Value]) -> Result<Value> {
        validate_args(args, 1, 1)?;
        validate_type(&args[0], &[ValueType::Array])?;
        let Some(arr) = args[0].as_array() else {
            return Ok(Value::None);
        };

        let mut max: Option<f64> = None;
        for item in arr.iter() {
            let Some(n) = item.as_f64() else {
                return Ok(Value::None);
            };
            max = Some(match max {
                Some(m) if m >= n => m,
                _ => n,
            });
        }
        Ok(max.map(Value::Float).unwrap_or(Value::None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_core::{Array, Error};

    async fn max(values: Vec<Value>) -> Result<Value> {
        MaxFunction
            .call(&FunctionContext::default(), &[Value::from(values)])
            .await
    }

    #[tokio::test]
    async fn test_max_mixed_numbers() {
        let got = max(vec![Value::from(1), Value::from(7.5), Value::from(3)])
            .await
            .unwrap();
        assert_eq!(got, Value::Float(7.5));
    }

    #[tokio::test]
    async fn test_max_all_negative() {
        let got = max(vec![Value::from(-4), Value::from(-2)]).await.unwrap();
        assert_eq!(got, Value::Float(-2.0));
    }

    #[tokio::test]
    async fn test_max_empty_or_non_numeric_is_none() {
        assert!(max(vec![]).await.unwrap().is_none());
        assert!(max(vec![Value::from(1), Value::from("x")])
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_max_requires_array() {
        let err = MaxFunction
            .call(&FunctionContext::default(), &[Value::from(Array::new()), Value::from(1)])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgumentCount { .. }));

        let err = MaxFunction
            .call(&FunctionContext::default(), &[Value::from(3)])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidType(_)));
    }
}
