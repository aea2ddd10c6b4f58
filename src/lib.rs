pub mod ebi_framework {
    pub mod activity_key;
    pub mod ebi_command;
    pub mod ebi_output;
    pub mod exportable;
    pub mod importable;
}
pub mod ebi_commands {
    pub mod ebi_command_align;
}
pub mod ebi_objects {
    pub mod accepting_petri_net;
    pub mod alignments;
    pub mod finite_language;
}
pub mod ebi_alignments {
    pub mod alignment_error;
    pub mod cross_product_net;
    pub mod cross_product_place;
    pub mod cross_product_search_state;
    pub mod incidence_matrix;
    pub mod linear_programming_solver;
    pub mod move_costs;
    pub mod state_equation_astar;
    pub mod trace_net;
}
pub mod techniques {
    pub mod align;
}
pub mod line_reader;
pub mod marking;
pub mod net;
