pub mod assistant;
pub mod attachments;
pub mod channels;
pub mod health;
pub mod invites;
pub mod media;
pub mod messages;
pub mod profiles;
pub mod servers;
