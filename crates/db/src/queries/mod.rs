pub mod air_states;
