//! Standard JSON-RPC and LSP error codes.

/// Invalid JSON was received by the server.
pub const PARSE_ERROR: i32 = -32700;
/// The JSON sent is not a valid request object.
pub const INVALID_REQUEST: i32 = -32600;
/// The method does not exist or is not available.
pub const METHOD_NOT_FOUND: i32 = -32601;
/// Invalid method parameters.
pub const INVALID_PARAMS: i32 = -32602;
/// Internal JSON-RPC error.
pub const INTERNAL_ERROR: i32 = -32603;

/// A request was cancelled by the client (`$/cancelRequest`).
pub const REQUEST_CANCELLED: i32 = -32800;
/// A request failed because the server was not yet initialized, or was
/// received after shutdown.
pub const SERVER_NOT_INITIALIZED: i32 = -32002;
