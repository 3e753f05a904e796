// src/utils/html.rs

/// Sanitises user-authored or AI-generated text with `ammonia` before storage.
///
/// Safe inline tags such as `<b>` survive; `<script>` elements are removed with
/// their content, as are event-handler attributes.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
