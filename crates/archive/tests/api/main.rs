mod health;
mod helpers;
mod readings;
