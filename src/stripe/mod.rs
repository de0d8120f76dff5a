pub mod client;

pub use client::{
    Charge, CheckoutSession, CheckoutSessionParams, PaymentIntent, StripeClient, StripeError,
};
