use std::collections::BTreeMap;

use chrono::{DateTime, Local, Utc};

use crate::config::provider::ProviderConfig;
use crate::notice::request::ValidatedNotice;
use crate::provider::types::{TemplateMessage, TemplateValue};

pub static FIELD_PLATFORM: &str = "platform";
pub static FIELD_SUBJECT: &str = "subject";
pub static FIELD_DESCRIPTION: &str = "description";
pub static FIELD_TIME: &str = "time";

static TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Map a notice onto the fixed remote template.
///
/// Values are forwarded as-is; any length limit is the provider's business.
pub fn build_template_message(
    notice: &ValidatedNotice,
    provider: &ProviderConfig,
    sent_at: DateTime<Utc>,
) -> TemplateMessage {
    let mut data = BTreeMap::new();
    data.insert(FIELD_PLATFORM.to_owned(), TemplateValue::new(notice.platform.as_str()));
    data.insert(FIELD_SUBJECT.to_owned(), TemplateValue::new(notice.subject.as_str()));
    data.insert(FIELD_DESCRIPTION.to_owned(), TemplateValue::new(notice.description.as_str()));
    data.insert(
        FIELD_TIME.to_owned(),
        TemplateValue::new(sent_at.with_timezone(&Local).format(TIME_FORMAT).to_string()),
    );

    TemplateMessage {
        touser: provider.to_user.to_owned(),
        template_id: provider.template_id.to_owned(),
        url: notice.jump_url.to_owned(),
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn provider() -> ProviderConfig {
        ProviderConfig {
            app_id: "wx0123456789abcdef".into(),
            app_secret: "0123456789abcdef0123456789abcdef".into(),
            template_id: "tpl-1".into(),
            to_user: "openid-1".into(),
            api_base_url: "https://api.weixin.qq.com".into(),
        }
    }

    #[test]
    fn maps_fields_into_template() {
        let notice = ValidatedNotice {
            platform: "P".into(),
            subject: "S".into(),
            description: "D".into(),
            jump_url: "https://x".into(),
        };
        let sent_at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let message = build_template_message(&notice, &provider(), sent_at);

        assert_eq!(message.touser, "openid-1");
        assert_eq!(message.template_id, "tpl-1");
        assert_eq!(message.url, "https://x");
        assert_eq!(message.data[FIELD_PLATFORM].value, "P");
        assert_eq!(message.data[FIELD_SUBJECT].value, "S");
        assert_eq!(message.data[FIELD_DESCRIPTION].value, "D");
        assert_eq!(
            message.data[FIELD_TIME].value,
            sent_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
        );
    }

    #[test]
    fn long_description_is_not_truncated() {
        let description = "段落：这是测试内容，用于验证系统对长文本的处理能力。".repeat(200);
        let notice = ValidatedNotice {
            platform: "P".into(),
            subject: "S".into(),
            description: description.clone(),
            jump_url: "https://x".into(),
        };
        let message = build_template_message(&notice, &provider(), Utc::now());
        assert_eq!(message.data[FIELD_DESCRIPTION].value, description);
    }
}
