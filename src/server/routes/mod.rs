pub mod extraction_router;
