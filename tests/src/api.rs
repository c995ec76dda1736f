mod gate_flow;
mod replica;
mod stats;
