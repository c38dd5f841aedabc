//! 名前の正規化

use regex::Regex;
use std::sync::LazyLock;

static NON_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("valid regex"));

static STACK_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][-A-Za-z0-9]*$").expect("valid regex"));

/// CloudFormationのスタック名の最大長
pub const MAX_STACK_NAME_LEN: usize = 128;

/// CloudFormationのスタック名として使えるか
///
/// 英字で始まり、英数字と `-` のみで構成される必要があります。
pub fn is_valid_stack_name(name: &str) -> bool {
    name.len() <= MAX_STACK_NAME_LEN && STACK_NAME.is_match(name)
}

/// S3キーやファイル名に使える形へ正規化
///
/// 英数字以外の連続を `-` に置き換え、前後の `-` を除去します。
///
/// ```
/// use stratus_core::sanitized_name;
///
/// assert_eq!(sanitized_name("My Service"), "My-Service");
/// ```
pub fn sanitized_name(input: &str) -> String {
    NON_NAME_CHARS
        .replace_all(input, "-")
        .trim_matches('-')
        .to_string()
}

/// CloudFormationの論理IDに使える形（英数字のみ）へ変換
///
/// 区切り文字の直後は大文字にします（`hello-world` → `HelloWorld`）。
pub fn logical_name(input: &str) -> String {
    NON_NAME_CHARS
        .split(input)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_name() {
        assert_eq!(sanitized_name("demo"), "demo");
        assert_eq!(sanitized_name("my service/v2"), "my-service-v2");
        assert_eq!(sanitized_name("--odd__name!!"), "odd-name");
    }

    #[test]
    fn test_is_valid_stack_name() {
        assert!(is_valid_stack_name("demo"));
        assert!(is_valid_stack_name("My-Service-2"));
        assert!(!is_valid_stack_name("it's"));
        assert!(!is_valid_stack_name("2fast"));
        assert!(!is_valid_stack_name("my_service"));
        assert!(!is_valid_stack_name(""));
        assert!(!is_valid_stack_name(&"a".repeat(MAX_STACK_NAME_LEN + 1)));
    }

    #[test]
    fn test_logical_name() {
        assert_eq!(logical_name("hello"), "Hello");
        assert_eq!(logical_name("hello-world"), "HelloWorld");
        assert_eq!(logical_name("/users/{id}"), "UsersId");
        assert_eq!(logical_name(""), "");
    }
}
