pub mod algorithm;
pub mod dictionary;
pub mod personal;
pub mod record;
pub mod strength;
pub mod verdict;
pub mod wordlist;
