use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ImportSummary {
    pub imported: usize,
    /// 已存在 (同 issuer+name+last_four 或同 merchant+card_number) 而跳过的行数
    pub skipped: usize,
}
