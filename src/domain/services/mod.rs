pub mod check_in;
pub mod dispatcher;
pub mod lifecycle;
pub mod rsvp;
pub mod seating;
pub mod templates;
pub mod token_issuer;
