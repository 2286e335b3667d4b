use metroflow_core::Error;
use pyo3::PyErr;
use pyo3::exceptions::{PyLookupError, PyRuntimeError, PyTimeoutError, PyValueError};
use serde::Serialize;

/// Maps an engine error onto the closest Python exception
pub(crate) fn to_py_err(context: &str, error: Error) -> PyErr {
    let message = format!("{context}: {error}");
    match error {
        Error::InvalidInput(_) | Error::UnknownNode(_) => PyValueError::new_err(message),
        Error::NotFound { .. } => PyLookupError::new_err(message),
        Error::Cancelled | Error::Timeout => PyTimeoutError::new_err(message),
        _ => PyRuntimeError::new_err(message),
    }
}

pub(crate) fn as_json<T: Serialize>(value: &T, what: &str) -> Result<String, PyErr> {
    serde_json::to_string(value).map_err(|e| {
        PyRuntimeError::new_err(format!("Failed to serialize {what} to JSON: {e}"))
    })
}
