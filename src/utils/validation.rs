use validator::{Validate, ValidationErrors};

use crate::errors::AppError;

/// Runs `validator` rules on a payload, joining every field message into one validation error.
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate().map_err(map_validation_error)
}

fn map_validation_error(err: ValidationErrors) -> AppError {
    let mut messages: Vec<String> = err
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid ({})", field, e.code),
            })
        })
        .collect();
    messages.sort();
    AppError::Validation(messages.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::hired_employee::BatchEmployeesIn;

    #[test]
    fn empty_batch_message_is_plain() {
        let batch = BatchEmployeesIn { items: Vec::new() };
        match validate_payload(&batch).unwrap_err() {
            AppError::Validation(msg) => assert_eq!(msg, "items length must be between 1 and 1000"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
