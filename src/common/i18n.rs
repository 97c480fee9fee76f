// src/common/i18n.rs

use std::collections::HashMap;

pub const DEFAULT_LANG: &str = "en";

// Message catalog keyed by (language, message key).
// Templates may contain `{name}`, replaced by `I18n::format`.
const CATALOG: &[(&str, &str, &str)] = &[
    ("en", "order.success", "Order placed"),
    ("vi", "order.success", "Thành công"),
    ("en", "order.not_found", "Store or product not found"),
    ("vi", "order.not_found", "Không tìm thấy Cửa hàng hoặc Sản phẩm"),
    ("en", "order.product_unavailable", "{name} is not available right now"),
    ("vi", "order.product_unavailable", "Món {name} hiện không bán"),
    ("en", "order.no_recipe", "{name} has no recipe configured"),
    ("vi", "order.no_recipe", "Món {name} chưa có công thức!"),
    ("en", "order.insufficient_stock", "Out of stock: {name}"),
    ("vi", "order.insufficient_stock", "Hết hàng: {name}"),
    ("en", "inventory.not_found", "Store or ingredient not found"),
    ("vi", "inventory.not_found", "Không tìm thấy Cửa hàng hoặc Nguyên liệu"),
    ("en", "inventory.out_of_range", "Stock of this ingredient would exceed the maximum allowed"),
    ("vi", "inventory.out_of_range", "Tồn kho nguyên liệu vượt quá mức tối đa cho phép"),
    ("en", "request.invalid", "One or more fields are invalid"),
    ("vi", "request.invalid", "Một hoặc nhiều trường không hợp lệ"),
    ("en", "request.malformed", "The request body could not be read: {name}"),
    ("vi", "request.malformed", "Không đọc được nội dung yêu cầu: {name}"),
    ("en", "server.timeout", "The request took too long, please try again"),
    ("vi", "server.timeout", "Yêu cầu quá thời gian, vui lòng thử lại"),
    ("en", "server.error", "An unexpected error occurred"),
    ("vi", "server.error", "Đã xảy ra lỗi không mong muốn"),
];

#[derive(Debug, Clone)]
pub struct I18n {
    // lang -> key -> template
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl Default for I18n {
    fn default() -> Self {
        Self::new()
    }
}

impl I18n {
    pub fn new() -> Self {
        let mut messages: HashMap<&'static str, HashMap<&'static str, &'static str>> = HashMap::new();
        for &(lang, key, text) in CATALOG {
            messages.entry(lang).or_default().insert(key, text);
        }
        Self { messages }
    }

    pub fn supports(&self, lang: &str) -> bool {
        self.messages.contains_key(lang)
    }

    /// Looks up `key` in `lang`, falling back to the default language and
    /// finally to the key itself.
    pub fn get(&self, lang: &str, key: &str) -> String {
        self.lookup(lang, key)
            .or_else(|| self.lookup(DEFAULT_LANG, key))
            .map(str::to_string)
            .unwrap_or_else(|| key.to_string())
    }

    pub fn format(&self, lang: &str, key: &str, name: &str) -> String {
        self.get(lang, key).replace("{name}", name)
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&'static str> {
        self.messages.get(lang).and_then(|m| m.get(key)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_vietnamese_out_of_stock_message() {
        let i18n = I18n::new();
        assert_eq!(i18n.format("vi", "order.insufficient_stock", "Sữa"), "Hết hàng: Sữa");
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let i18n = I18n::new();
        assert!(!i18n.supports("fr"));
        assert_eq!(i18n.get("fr", "order.not_found"), "Store or product not found");
    }

    #[test]
    fn unknown_key_is_returned_verbatim() {
        let i18n = I18n::new();
        assert_eq!(i18n.get("en", "nope.missing"), "nope.missing");
    }
}
