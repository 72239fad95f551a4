/// Return a successful tool result carrying `$text`.
macro_rules! mcp_return {
    ($text:expr) => {
        return Ok(rmcp::model::CallToolResult::success(vec![
            rmcp::model::Content::text($text),
        ]))
    };
}

/// Return a tool result flagged as an error. The server keeps running.
macro_rules! mcp_error {
    ($text:expr) => {
        return Ok(rmcp::model::CallToolResult::error(vec![
            rmcp::model::Content::text($text),
        ]))
    };
}
