pub const GENERATE: &str = "/generate";
pub const LOGIN: &str = "/auth/login";
pub const REGISTER: &str = "/auth/register";
pub const ME: &str = "/auth/me";
pub const GALLERY: &str = "/gallery";
pub const USER_IMAGES: &str = "/user-images";
pub const CREDIT_PACKAGES: &str = "/payments/credit-packages";
pub const SUBSCRIPTION_PLANS: &str = "/payments/subscription-plans";
pub const USER_CREDITS: &str = "/payments/user/credits";
pub const PAYMENT_INTENT: &str = "/payments/create-payment-intent";
pub const SUBSCRIPTIONS: &str = "/payments/subscriptions";

pub fn status(job_id: &str) -> String {
    format!("/status/{}", job_id)
}
