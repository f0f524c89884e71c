use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::models::ApiConfig;

/// 票券状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    /// 待支付
    Pending,
    /// 已支付,待核销
    Confirmed,
    /// 已退款
    Refunded,
    /// 已过期
    Expired,
}

impl TicketStatus {
    /// 状态文本
    pub fn text(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "待支付",
            TicketStatus::Confirmed => "待核销",
            TicketStatus::Refunded => "已退款",
            TicketStatus::Expired => "已过期",
        }
    }

    /// 状态说明
    pub fn description(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "订单待支付，请尽快完成支付",
            TicketStatus::Confirmed => "票券待使用，请按时参加活动",
            TicketStatus::Refunded => "退款已处理，请注意查收",
            TicketStatus::Expired => "订单已过期，无法使用",
        }
    }

    /// 前端样式类名
    pub fn css_class(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "status-pending",
            TicketStatus::Confirmed => "status-confirmed",
            TicketStatus::Refunded => "status-refunded",
            TicketStatus::Expired => "status-expired",
        }
    }

    /// 操作按钮文本
    pub fn button_text(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "立即支付",
            TicketStatus::Confirmed => "申请退票",
            TicketStatus::Expired => "再来一单",
            TicketStatus::Refunded => "查看退款详情",
        }
    }
}

/// 票券
///
/// 当前版本为演示数据,不经后端持久化。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: i64,
    pub concert_id: i64,
    pub city: String,
    pub concert_name: String,
    pub concert_image: String,
    pub date: String,
    pub time: String,
    pub venue: String,
    pub seat_area: String,
    pub seat_number: String,
    pub price: f64,
    pub status: TicketStatus,
    pub purchase_time: String,
    pub order_number: String,
    pub ticket_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund_deadline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund_time: Option<String>,
}

impl Ticket {
    /// 构造核销二维码载荷
    ///
    /// 仅待核销状态的票券可生成,其余状态返回 None。
    pub fn qr_payload(&self) -> Option<QrCodeData> {
        if self.status != TicketStatus::Confirmed {
            return None;
        }
        Some(QrCodeData {
            ticket_id: self.id,
            ticket_number: self.ticket_number.clone(),
            order_number: self.order_number.clone(),
            concert_name: self.concert_name.clone(),
            date: self.date.clone(),
            time: self.time.clone(),
            venue: self.venue.clone(),
            seat_area: self.seat_area.clone(),
            seat_number: self.seat_number.clone(),
            price: self.price,
        })
    }

    /// 演示票券 (硬编码样例数据)
    pub fn demo() -> Self {
        Self {
            id: 1,
            concert_id: 1,
            city: "北京".to_string(),
            concert_name: "2025新年演唱会".to_string(),
            concert_image: "https://test.3fenban.com/static/concert/1.jpg".to_string(),
            date: "2025-12-31".to_string(),
            time: "19:30".to_string(),
            venue: "国家体育场".to_string(),
            seat_area: "A区".to_string(),
            seat_number: "12排08号".to_string(),
            price: 680.0,
            status: TicketStatus::Confirmed,
            purchase_time: "2025-10-17 14:32".to_string(),
            order_number: "ORD20251017001".to_string(),
            ticket_number: "TKT20251017001".to_string(),
            refund_deadline: Some("2025-12-24".to_string()),
            expire_time: None,
            refund_time: None,
        }
    }
}

/// 核销二维码载荷
///
/// 渲染器将其编码为核销URL后绘制;本模块只负责数据。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeData {
    pub ticket_id: i64,
    pub ticket_number: String,
    pub order_number: String,
    pub concert_name: String,
    pub date: String,
    pub time: String,
    pub venue: String,
    pub seat_area: String,
    pub seat_number: String,
    pub price: f64,
}

impl QrCodeData {
    /// 构造完整的核销URL (后台地址 + URL编码的票务参数)
    ///
    /// 基础地址无法解析时返回 None。
    pub fn verify_url(&self, config: &ApiConfig) -> Option<String> {
        let base = config.build_url(crate::models::endpoints::TICKET_VERIFY);
        let mut url = Url::parse(&base).ok()?;
        url.query_pairs_mut()
            .append_pair("ticketId", &self.ticket_id.to_string())
            .append_pair("ticketNumber", &self.ticket_number)
            .append_pair("orderNumber", &self.order_number)
            .append_pair("concertName", &self.concert_name)
            .append_pair("date", &self.date)
            .append_pair("time", &self.time)
            .append_pair("venue", &self.venue)
            .append_pair("seatArea", &self.seat_area)
            .append_pair("seatNumber", &self.seat_number)
            .append_pair("price", &self.price.to_string());
        Some(url.to_string())
    }
}
