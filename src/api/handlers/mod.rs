pub mod guest;
pub mod health;
pub mod notification;
pub mod rsvp;
pub mod seating;
pub mod wedding;
