pub mod items_docx;
