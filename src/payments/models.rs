use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Success,
    Failed,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Processing => "processing",
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Cancelled => "cancelled",
        }
    }
}

/// Accepts both the stored snake_case values and the labels the payment
/// form shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[serde(alias = "Card")]
    Card,
    #[serde(alias = "Mobile Money", alias = "mobile-money")]
    MobileMoney,
    #[serde(alias = "Bank Transfer", alias = "bank-transfer")]
    BankTransfer,
    #[serde(alias = "USSD")]
    Ussd,
    #[serde(alias = "QR Code", alias = "qr-code")]
    QrCode,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::MobileMoney => "mobile_money",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Ussd => "ussd",
            PaymentMethod::QrCode => "qr_code",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MobileMoneyProvider {
    #[serde(alias = "MTN")]
    Mtn,
    #[serde(alias = "AirtelTigo")]
    Airteltigo,
    #[serde(alias = "Vodafone")]
    Vodafone,
}

impl MobileMoneyProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            MobileMoneyProvider::Mtn => "mtn",
            MobileMoneyProvider::Airteltigo => "airteltigo",
            MobileMoneyProvider::Vodafone => "vodafone",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: i64,
    pub reference: String,
    pub amount: f64,
    pub currency: String,
    pub status: String,
    pub customer_email: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub payment_method: String,
    pub mobile_money_provider: Option<String>,
    pub description: Option<String>,
    pub collection_id: Option<i64>,
    pub collection_title: Option<String>,
    pub created_at: String,
    pub processed_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitPaymentRequest {
    pub amount: f64,
    pub currency: Option<String>,
    #[serde(alias = "email")]
    pub customer_email: String,
    #[serde(alias = "name")]
    pub customer_name: String,
    #[serde(alias = "phone", alias = "mobile_money_number")]
    pub customer_phone: Option<String>,
    pub payment_method: PaymentMethod,
    pub mobile_money_provider: Option<MobileMoneyProvider>,
    pub description: Option<String>,
    pub collection_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SubmitPaymentResponse {
    pub success: bool,
    pub message: String,
    pub payment: Payment,
}

#[derive(Debug, Serialize)]
pub struct PaymentListResponse {
    pub payments: Vec<Payment>,
}

#[derive(Debug, Serialize)]
pub struct PaymentVerification {
    pub reference: String,
    pub status: String,
    pub amount: f64,
    pub currency: String,
    pub collection_id: Option<i64>,
    pub collection_title: Option<String>,
    pub processed_at: Option<String>,
}

impl From<Payment> for PaymentVerification {
    fn from(payment: Payment) -> Self {
        Self {
            reference: payment.reference,
            status: payment.status,
            amount: payment.amount,
            currency: payment.currency,
            collection_id: payment.collection_id,
            collection_title: payment.collection_title,
            processed_at: payment.processed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PaymentStats {
    pub total_payments: i64,
    pub successful_payments: i64,
    pub failed_payments: i64,
    pub pending_payments: i64,
    pub total_revenue: f64,
    pub success_rate: f64,
}
