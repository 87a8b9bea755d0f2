mod bridge_protocol_steps;
mod cata_editing_steps;
mod check_cycle_steps;
mod rule_algebra_steps;
