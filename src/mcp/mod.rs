pub mod mcp;
pub mod rpc;
pub mod tools;
