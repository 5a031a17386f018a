pub mod iff;
