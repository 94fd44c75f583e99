//! User-facing strings, one table per language.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Vietnamese,
    English,
}

/// Fixed text shown by the chat and the payment screens
#[derive(Debug)]
pub struct Strings {
    pub greeting: &'static str,
    pub input_placeholder: &'static str,
    pub assistant_typing: &'static str,
    pub suggestions_title: &'static str,
    /// Shown when the backend answers but reports it could not help
    pub failure_apology: &'static str,
    /// Shown when the request itself fails or times out
    pub error_apology: &'static str,
    pub payment_description: &'static str,
    pub confirm_title: &'static str,
    pub amount_label: &'static str,
    pub account_id_label: &'static str,
    pub account_name_label: &'static str,
    pub description_label: &'static str,
    pub cancel_label: &'static str,
    pub continue_label: &'static str,
    pub verification_title: &'static str,
    pub transaction_id_label: &'static str,
    pub date_label: &'static str,
    pub status_label: &'static str,
    pub status_pending: &'static str,
    pub complete_label: &'static str,
    pub processing: &'static str,
    pub success: &'static str,
    pub user_label: &'static str,
    pub assistant_label: &'static str,
}

static VIETNAMESE: Strings = Strings {
    greeting: "Xin chào! Tôi là Trợ lý ảo của ngân hàng, tôi có thể giúp gì cho bạn hôm nay?",
    input_placeholder: "Nhập câu hỏi tại đây",
    assistant_typing: "Trợ lý đang trả lời",
    suggestions_title: "Gợi ý câu hỏi",
    failure_apology: "Xin lỗi, tôi không thể xử lý yêu cầu của bạn. Vui lòng thử lại.",
    error_apology: "Xin lỗi, đã xảy ra lỗi khi xử lý yêu cầu của bạn. Vui lòng thử lại sau.",
    payment_description: "Thanh toán cho dịch vụ ngân hàng",
    confirm_title: "Xác nhận giao dịch",
    amount_label: "Số tiền",
    account_id_label: "Số tài khoản nhận",
    account_name_label: "Tên tài khoản nhận",
    description_label: "Nội dung",
    cancel_label: "Hủy",
    continue_label: "Tiếp tục thanh toán",
    verification_title: "Xác minh thanh toán",
    transaction_id_label: "Mã giao dịch",
    date_label: "Ngày giờ",
    status_label: "Trạng thái",
    status_pending: "Đang chờ",
    complete_label: "Hoàn tất thanh toán",
    processing: "Đang xử lý thanh toán",
    success: "Thanh toán thành công!",
    user_label: "Bạn",
    assistant_label: "Trợ lý",
};

static ENGLISH: Strings = Strings {
    greeting: "Hello! I'm the bank's virtual assistant. How can I help you today?",
    input_placeholder: "Type your question here",
    assistant_typing: "Assistant is replying",
    suggestions_title: "Suggested questions",
    failure_apology: "Sorry, I couldn't process your request. Please try again.",
    error_apology: "Sorry, something went wrong while processing your request. Please try again later.",
    payment_description: "Payment for banking service",
    confirm_title: "Confirm transaction",
    amount_label: "Amount",
    account_id_label: "Account ID",
    account_name_label: "Account Name",
    description_label: "Description",
    cancel_label: "Cancel",
    continue_label: "Continue to payment",
    verification_title: "Payment Verification",
    transaction_id_label: "Transaction ID",
    date_label: "Date & Time",
    status_label: "Status",
    status_pending: "Pending",
    complete_label: "Complete Payment",
    processing: "Processing payment",
    success: "Payment Successful!",
    user_label: "You",
    assistant_label: "Assistant",
};

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Vietnamese => "vi",
            Locale::English => "en",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "vi" | "vi-vn" | "vietnamese" => Some(Locale::Vietnamese),
            "en" | "en-us" | "english" => Some(Locale::English),
            _ => None,
        }
    }

    pub fn all() -> Vec<Locale> {
        vec![Locale::Vietnamese, Locale::English]
    }

    /// The locale after this one in `all()`, wrapping around
    pub fn next(&self) -> Locale {
        let all = Locale::all();
        let i = all.iter().position(|l| l == self).unwrap_or(0);
        all[(i + 1) % all.len()]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Locale::Vietnamese => "Tiếng Việt",
            Locale::English => "English",
        }
    }

    pub fn strings(&self) -> &'static Strings {
        match self {
            Locale::Vietnamese => &VIETNAMESE,
            Locale::English => &ENGLISH,
        }
    }

    /// Thousands separator and decimal mark for amounts
    pub fn number_marks(&self) -> (char, char) {
        match self {
            Locale::Vietnamese => ('.', ','),
            Locale::English => (',', '.'),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_cycles_through_all() {
        assert_eq!(Locale::Vietnamese.next(), Locale::English);
        assert_eq!(Locale::English.next(), Locale::Vietnamese);
    }

    #[test]
    fn test_from_str_round_trips_as_str() {
        for locale in Locale::all() {
            assert_eq!(Locale::from_str(locale.as_str()), Some(locale));
        }
        assert_eq!(Locale::from_str(" EN "), Some(Locale::English));
        assert_eq!(Locale::from_str("fr"), None);
    }

    #[test]
    fn test_apologies_differ_by_cause() {
        for locale in Locale::all() {
            let s = locale.strings();
            assert_ne!(s.failure_apology, s.error_apology);
        }
    }
}
