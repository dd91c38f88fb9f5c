mod components;
mod email;
mod helpers;
