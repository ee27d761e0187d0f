use anyhow::Result;
use socrata::{Client, display, select_permalink};
use std::path::Path;

fn main() -> Result<()> {
    // Walks the public catalog: first domain, first dataset, saved to the working directory.
    let client = Client::from_env()?;

    let domains = client.list_domains(None)?;
    print!("{}", display::domain_table(&domains[..domains.len().min(10)]));

    let datasets = client.list_datasets(&domains, None)?;
    print!("{}", display::dataset_table(&datasets));

    let permalink = select_permalink(&datasets, None)?;
    let path = client.download(permalink, Path::new("."))?;
    println!("saved {}", path.display());
    Ok(())
}
