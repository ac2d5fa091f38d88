use curl_particles::run;

fn main() -> anyhow::Result<()> {
    run()
}
