pub mod categoria;
pub mod tarefa;
