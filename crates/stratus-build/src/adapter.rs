//! Node.jsアダプタ（index.js）の生成

use stratus_core::FunctionSpec;

/// 自動生成部分の開始マーカー
pub const GENERATED_MARKER: &str =
    "// DO NOT EDIT - CONTENT UNTIL EOF IS AUTOMATICALLY GENERATED";

/// 関数1つ分のエクスポート行
pub fn forwarder_entry(function: &FunctionSpec) -> String {
    format!(
        "exports[\"{}\"] = createForwarder(\"/{}\");\n",
        function.handler_name(),
        function.name
    )
}

/// ベースソースに関数エクスポートとバイナリ名・サービス名を追記
///
/// 同じ入力からは常にバイト単位で同一の出力になります。
pub fn generate_adapter(
    base: &str,
    functions: &[FunctionSpec],
    binary_name: &str,
    service_name: &str,
) -> String {
    let mut source = String::with_capacity(base.len() + 128 * (functions.len() + 1));
    source.push_str(base);
    source.push('\n');
    source.push_str(GENERATED_MARKER);
    source.push('\n');
    for function in functions {
        tracing::info!("Registering function: {}", function.name);
        source.push_str(&forwarder_entry(function));
    }
    source.push_str(&format!(
        "STRATUS_BINARY_NAME='{}';\n",
        escape_js_string(binary_name)
    ));
    source.push_str(&format!(
        "STRATUS_SERVICE_NAME='{}';\n",
        escape_js_string(service_name)
    ));
    source
}

/// 単一引用符のJS文字列リテラル内に埋め込めるようエスケープ
fn escape_js_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\u{2028}' => escaped.push_str("\\u2028"),
            '\u{2029}' => escaped.push_str("\\u2029"),
            c => escaped.push(c),
        }
    }
    escaped
}
