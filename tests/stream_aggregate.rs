use aigw_schema::protocol::openai::ChatCompletionResponseChunk;
use aigw_schema::stream::aggregate::{aggregate_chat_sse_response, AGGREGATE_OBJECT};
use aigw_schema::{
    aggregate_chat_chunks, aggregate_chat_sse, decode_chat_completion_chunk, ErrorCategory,
    SchemaError, SseChatAggregator,
};
use serde_json::{json, Value};

fn sse(events: &[Value]) -> Vec<u8> {
    let mut body = Vec::new();
    for event in events {
        body.extend_from_slice(b"data: ");
        body.extend_from_slice(event.to_string().as_bytes());
        body.extend_from_slice(b"\n\n");
    }
    body.extend_from_slice(b"data: [DONE]\n\n");
    body
}

fn hello_world_events() -> Vec<Value> {
    vec![
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion.chunk",
            "created": 1_755_137_933,
            "model": "gpt-4o-mini",
            "choices": [{"index": 0, "delta": {"role": "assistant", "content": "Hello"}, "finish_reason": null}]
        }),
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion.chunk",
            "created": 1_755_137_933,
            "model": "gpt-4o-mini",
            "choices": [{"index": 0, "delta": {"content": " world"}, "finish_reason": null}]
        }),
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion.chunk",
            "created": 1_755_137_933,
            "model": "gpt-4o-mini",
            "choices": [{"index": 0, "delta": {}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7}
        }),
    ]
}

#[test]
fn test_three_fragment_stream() {
    let body = sse(&hello_world_events());
    let encoded = aggregate_chat_sse(&body).unwrap();
    let response: Value = serde_json::from_slice(&encoded).unwrap();

    assert_eq!(
        response,
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion.chunk",
            "created": 1_755_137_933,
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Hello world"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7}
        })
    );
}

#[test]
fn test_buffered_and_chunk_list_forms_agree() {
    let events = hello_world_events();
    let chunks: Vec<ChatCompletionResponseChunk> = events
        .iter()
        .map(|e| decode_chat_completion_chunk(e.to_string().as_bytes()).unwrap())
        .collect();

    let from_chunks = aggregate_chat_chunks(&chunks);
    let from_sse = aggregate_chat_sse_response(&sse(&events)).unwrap();
    assert_eq!(from_chunks, from_sse);
    assert_eq!(from_sse.first_content(), Some("Hello world"));
}

#[test]
fn test_byte_by_byte_feed_matches_buffered() {
    let body = sse(&hello_world_events());
    let mut aggregator = SseChatAggregator::new();
    for byte in &body {
        aggregator.feed(std::slice::from_ref(byte)).unwrap();
    }
    let incremental = aggregator.finish().unwrap();
    assert_eq!(incremental, aggregate_chat_sse_response(&body).unwrap());
}

#[test]
fn test_crlf_framing_and_unterminated_tail() {
    let body = b"data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"a\"}}]}\r\n\r\n\
                 : keep-alive\r\n\
                 data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"b\"}}]}";
    let response = aggregate_chat_sse_response(body).unwrap();
    assert_eq!(response.first_content(), Some("ab"));
    assert_eq!(response.choices[0].finish_reason, "stop");
}

#[test]
fn test_empty_input_yields_empty_output() {
    assert!(aggregate_chat_sse(b"").unwrap().is_empty());
}

#[test]
fn test_done_only_yields_minimal_response() {
    let encoded = aggregate_chat_sse(b"data: [DONE]\n\n").unwrap();
    let response: Value = serde_json::from_slice(&encoded).unwrap();
    assert_eq!(
        response,
        json!({
            "object": AGGREGATE_OBJECT,
            "choices": [{"index": 0, "message": {}, "finish_reason": "stop"}]
        })
    );
}

#[test]
fn test_roleless_stream_omits_role() {
    let body = sse(&[
        json!({"id": "chatcmpl-2", "object": "chat.completion.chunk", "created": 1_755_137_933, "model": "gpt-4o-mini",
               "choices": [{"index": 0, "delta": {"content": "Hi"}, "finish_reason": null}]}),
        json!({"id": "chatcmpl-2", "object": "chat.completion.chunk", "created": 1_755_137_933, "model": "gpt-4o-mini",
               "choices": [{"index": 0, "delta": {}, "finish_reason": "stop"}]}),
    ]);
    let encoded = aggregate_chat_sse(&body).unwrap();
    let response: Value = serde_json::from_slice(&encoded).unwrap();
    assert_eq!(
        response,
        json!({
            "id": "chatcmpl-2",
            "object": AGGREGATE_OBJECT,
            "created": 1_755_137_933,
            "model": "gpt-4o-mini",
            "choices": [{"index": 0, "message": {"content": "Hi"}, "finish_reason": "stop"}]
        })
    );
}

#[test]
fn test_vendor_nulls_do_not_abort_stream() {
    let body = sse(&[
        json!({"id": null, "object": "chat.completion.chunk", "model": null,
               "choices": [{"index": 0, "delta": {"role": "assistant", "content": "x", "tool_calls": null}}]}),
        json!({"choices": [{"index": 0, "delta": {"tool_calls": [
            {"index": 0, "id": "call_1", "type": "function", "function": {"name": "lookup", "arguments": "{\"q\""}}
        ]}}]}),
        json!({"choices": [{"index": 0, "delta": {"tool_calls": [
            {"index": 0, "id": null, "type": null, "function": {"name": null, "arguments": ":1}"}}
        ]}, "finish_reason": "tool_calls"}]}),
    ]);
    let response = aggregate_chat_sse_response(&body).unwrap();
    assert!(response.id.is_empty());
    assert!(response.model.is_empty());

    let message = &response.choices[0].message;
    assert_eq!(message.content.as_deref(), Some("x"));
    assert_eq!(message.tool_calls.len(), 1);
    let call = &message.tool_calls[0];
    assert_eq!(call.id.as_deref(), Some("call_1"));
    assert_eq!(call.type_, "function");
    assert_eq!(call.function.name, "lookup");
    assert_eq!(call.function.arguments, "{\"q\":1}");
    assert_eq!(response.choices[0].finish_reason, "tool_calls");
}

#[test]
fn test_fragments_after_done_are_ignored() {
    let mut body = sse(&hello_world_events());
    body.extend_from_slice(b"data: {\"choices\":[{\"delta\":{\"content\":\"!!!\"}}]}\n\ndata: garbage\n");
    let response = aggregate_chat_sse_response(&body).unwrap();
    assert_eq!(response.first_content(), Some("Hello world"));
}

#[test]
fn test_invalid_fragment_aborts() {
    let body = b"data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n\ndata: {not json}\n\ndata: [DONE]\n";
    let err = aggregate_chat_sse(body).unwrap_err();
    assert!(matches!(err, SchemaError::Chunk(_)));
    assert_eq!(err.category(), ErrorCategory::StreamFraming);
    assert!(
        err.to_string().starts_with("failed to unmarshal chunk: "),
        "{err}"
    );
}

#[test]
fn test_tool_call_stream() {
    let events = vec![
        json!({"choices": [{"index": 0, "delta": {"role": "assistant", "tool_calls": [
            {"index": 0, "id": "call_1", "type": "function", "function": {"name": "get_weather", "arguments": ""}}
        ]}}]}),
        json!({"choices": [{"index": 0, "delta": {"tool_calls": [
            {"index": 0, "function": {"arguments": "{\"city\":"}}
        ]}}]}),
        json!({"choices": [{"index": 0, "delta": {"tool_calls": [
            {"index": 0, "function": {"arguments": "\"Paris\"}"}}
        ]}}]}),
        json!({"choices": [{"index": 0, "delta": {}, "finish_reason": "tool_calls"}]}),
    ];
    let response = aggregate_chat_sse_response(&sse(&events)).unwrap();
    let choice = &response.choices[0];
    assert_eq!(choice.finish_reason, "tool_calls");
    assert_eq!(choice.message.content.as_deref(), Some(""));
    assert_eq!(
        serde_json::to_value(&choice.message.tool_calls).unwrap(),
        json!([{
            "id": "call_1",
            "type": "function",
            "function": {"name": "get_weather", "arguments": "{\"city\":\"Paris\"}"}
        }])
    );
}

#[test]
fn test_annotations_and_obfuscation() {
    let citation = |start: i64| {
        json!({"type": "url_citation", "url_citation": {
            "end_index": start + 5, "start_index": start, "title": "t", "url": "https://example.com"
        }})
    };
    let events = vec![
        json!({"choices": [{"index": 0, "delta": {"content": "a", "annotations": [citation(0)]}}], "obfuscation": "x1"}),
        json!({"choices": [{"index": 0, "delta": {"content": "b", "annotations": [citation(10)]}}], "obfuscation": "x2"}),
        json!({"choices": [{"index": 0, "delta": {}}]}),
    ];
    let response = aggregate_chat_sse_response(&sse(&events)).unwrap();
    let annotations = response.choices[0].message.annotations.as_ref().unwrap();
    let starts: Vec<i64> = annotations
        .iter()
        .filter_map(|a| a.url_citation.as_ref().map(|c| c.start_index))
        .collect();
    assert_eq!(starts, vec![0, 10]);
    assert_eq!(response.obfuscation, "x2");
}
