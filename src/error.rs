use wasm_bindgen::JsValue;

use crate::simulator::WalkingState;

/// A GPX document that cannot be turned into a route.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Document has no <gpx> root element")]
    MissingRoot,
    #[error("Unexpected root element <{0}>")]
    UnexpectedRoot(String),
    #[error("Root <gpx> element declares no namespace")]
    MissingNamespace,
    #[error("Unrecognized GPX namespace '{0}'")]
    UnrecognizedNamespace(String),
    #[error("Missing attribute '{attribute}' on <{element}>")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    #[error("Invalid value '{value}' for attribute '{attribute}' on <{element}>")]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },
    #[error("Invalid value '{value}' in <{element}>")]
    InvalidElement {
        element: &'static str,
        value: String,
    },
    #[error("Document ended inside <{0}>")]
    UnexpectedEof(String),
    #[error("Encoded document is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Route authoring failures. The route is left unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RouteError {
    #[error("Index {index} is out of range for a route of {len} points")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Coordinate ({latitude}, {longitude}) is outside the valid domain")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
    #[error("Cannot read a coordinate from '{0}'")]
    UnparsableCoordinate(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulatorError {
    #[error("A route of at least two points is required to walk, got {points}")]
    NoRouteLoaded { points: usize },
    #[error("Cannot advance along a route of {points} points")]
    PrerequisiteNotMet { points: usize },
    #[error("Cannot {action} while {from:?}")]
    InvalidTransition {
        from: WalkingState,
        action: &'static str,
    },
    #[error("The route cannot be edited while walking")]
    RouteLocked,
    #[error("Speed must be a finite, non-negative number of meters per second, got {mps}")]
    InvalidSpeed { mps: f64 },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error(transparent)]
    Simulator(#[from] SimulatorError),
}

impl From<Error> for JsValue {
    fn from(e: Error) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

impl From<FormatError> for JsValue {
    fn from(e: FormatError) -> Self {
        Error::from(e).into()
    }
}

impl From<RouteError> for JsValue {
    fn from(e: RouteError) -> Self {
        Error::from(e).into()
    }
}

impl From<SimulatorError> for JsValue {
    fn from(e: SimulatorError) -> Self {
        Error::from(e).into()
    }
}
