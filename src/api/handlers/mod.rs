// API handlers - thin HTTP orchestration layer.
// Handlers only deal with HTTP concerns:
// 1. Extract and validate request input
// 2. Call store operations
// 3. Transform store results into the response envelope

pub mod students;

pub use students::{
    create_student_handler, delete_student_handler, get_student_handler, list_students_handler,
    update_student_handler,
};
