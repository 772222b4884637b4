pub mod applications;
pub mod leaves;
pub mod onboarding;
pub mod payslips;
pub mod uploads;
