pub(crate) mod home;
pub(crate) mod post_card;
