pub mod synthetic_hand;
