/// Utilitários para manipulação segura de strings UTF-8

/// Trunca uma string sem cortar um caractere UTF-8 no meio
///
/// # Exemplo
/// ```
/// use recrutamento_client::utils::string_utils::truncate_safe;
///
/// assert_eq!(truncate_safe("Olá, mundo!", 4), "Olá");
/// ```
pub fn truncate_safe(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }

    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }

    &s[..end]
}

/// Prévia de um token para logs: primeiros e últimos 4 caracteres
///
/// Tokens curtos demais viram `***` para não vazar o valor inteiro.
pub fn token_preview(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 10 {
        return "***".to_string();
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Corpo de resposta resumido para logs de debug
pub fn body_preview(body: &str) -> String {
    const MAX: usize = 512;
    let truncated = truncate_safe(body, MAX);
    if truncated.len() < body.len() {
        format!("{}... ({} bytes)", truncated, body.len())
    } else {
        truncated.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_safe_ascii() {
        assert_eq!(truncate_safe("Hello, world!", 5), "Hello");
        assert_eq!(truncate_safe("Hi", 10), "Hi");
    }

    #[test]
    fn test_truncate_safe_multibyte() {
        // 'ã' ocupa 2 bytes; cortar no byte 3 cairia no meio dele
        assert_eq!(truncate_safe("Não", 2), "N");
        assert_eq!(truncate_safe("Não", 3), "Nã");
    }

    #[test]
    fn test_token_preview() {
        assert_eq!(token_preview("abcdefghijklmnop"), "abcd...mnop");
        assert_eq!(token_preview("curto"), "***");
    }

    #[test]
    fn test_body_preview_marks_truncation() {
        let body = "x".repeat(600);
        let preview = body_preview(&body);
        assert!(preview.ends_with("(600 bytes)"));
        assert_eq!(body_preview("{}"), "{}");
    }
}
